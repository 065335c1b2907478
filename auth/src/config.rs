use std::str::FromStr;

use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::Algorithm;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use thiserror::Error;

/// Error for invalid token settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenConfigError {
    #[error("Signing secret must not be empty")]
    EmptySecret,

    #[error("Unknown signing algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Signing algorithm {0} is not a symmetric HMAC algorithm")]
    UnsupportedAlgorithm(String),

    #[error("{name} must be positive, got {value}")]
    NonPositiveTtl { name: &'static str, value: i64 },

    #[error("{name} is too large to compute an expiry from")]
    TtlOutOfRange { name: &'static str },
}

/// Token settings, read once at startup and immutable afterwards.
///
/// Shared by reference with [`TokenCodec`](crate::TokenCodec). The secret is
/// wrapped in [`SecretString`] so it never shows up in `Debug` output.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    secret: SecretString,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenConfig {
    /// Build validated token settings.
    ///
    /// `refresh_ttl` is expected to be at least `access_ttl` but this is not
    /// enforced.
    ///
    /// # Errors
    /// * `EmptySecret` - Secret is empty
    /// * `UnsupportedAlgorithm` - Algorithm is not HS256, HS384 or HS512
    /// * `NonPositiveTtl` - A lifetime is zero or negative
    /// * `TtlOutOfRange` - `now + ttl` is not a representable timestamp
    pub fn new(
        secret: SecretString,
        algorithm: Algorithm,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, TokenConfigError> {
        if secret.expose_secret().is_empty() {
            return Err(TokenConfigError::EmptySecret);
        }

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(TokenConfigError::UnsupportedAlgorithm(format!(
                "{:?}",
                algorithm
            )));
        }

        for (name, ttl) in [("access_ttl", access_ttl), ("refresh_ttl", refresh_ttl)] {
            if ttl <= Duration::zero() {
                return Err(TokenConfigError::NonPositiveTtl {
                    name,
                    value: ttl.num_seconds(),
                });
            }
            if Utc::now().checked_add_signed(ttl).is_none() {
                return Err(TokenConfigError::TtlOutOfRange { name });
            }
        }

        Ok(Self {
            secret,
            algorithm,
            access_ttl,
            refresh_ttl,
        })
    }

    /// Parse an algorithm identifier such as `"HS256"`.
    ///
    /// # Errors
    /// * `UnknownAlgorithm` - Not an algorithm name known to `jsonwebtoken`
    pub fn parse_algorithm(name: &str) -> Result<Algorithm, TokenConfigError> {
        Algorithm::from_str(name.trim())
            .map_err(|_| TokenConfigError::UnknownAlgorithm(name.to_string()))
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

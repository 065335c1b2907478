use chrono::Duration;
use chrono::Utc;
use secrecy::ExposeSecret;
use uuid::Uuid;

use super::claims::Claims;
use super::errors::JwtError;
use super::handler::JwtHandler;
use crate::config::TokenConfig;

/// Token codec for time-bound session tokens.
///
/// Wraps a [`JwtHandler`] with the access and refresh lifetimes from
/// [`TokenConfig`]. Every issued token gets `iat`, `exp` and a random `jti`,
/// the last one making two tokens for the same subject issued within the same
/// second distinct.
pub struct TokenCodec {
    handler: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            handler: JwtHandler::new(
                config.secret().expose_secret().as_bytes(),
                config.algorithm(),
            ),
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
        }
    }

    /// Issue a short-lived access token for `claims`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn encode_access(&self, claims: &Claims) -> Result<String, JwtError> {
        self.encode_with_ttl(claims, self.access_ttl)
    }

    /// Issue a long-lived refresh token for `claims`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn encode_refresh(&self, claims: &Claims) -> Result<String, JwtError> {
        self.encode_with_ttl(claims, self.refresh_ttl)
    }

    /// Issue a token expiring `ttl` from now.
    ///
    /// The caller's claims are copied, never modified. A negative `ttl` yields
    /// an already expired token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed, or `now + ttl` overflows
    pub fn encode_with_ttl(&self, claims: &Claims, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now();
        let token_id = claims
            .jti
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            JwtError::EncodingFailed(format!("Expiry out of range for ttl {}", ttl))
        })?;

        let issued = claims
            .clone()
            .with_issued_at(now.timestamp())
            .with_expiration(expires_at.timestamp())
            .with_token_id(token_id);

        self.handler.encode(&issued)
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    /// * `TokenExpired` - Signature is valid but `exp <= now`
    /// * `TokenInvalid` - Bad signature, malformed token, or missing `exp`
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let claims: Claims = self.handler.decode(token)?;

        if claims.is_expired(Utc::now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::Algorithm;
    use secrecy::SecretString;

    use super::*;

    fn codec() -> TokenCodec {
        let config = TokenConfig::new(
            SecretString::new("test_secret_key_at_least_32_bytes!".to_string()),
            Algorithm::HS256,
            Duration::minutes(30),
            Duration::days(7),
        )
        .expect("Invalid test config");
        TokenCodec::new(&config)
    }

    #[test]
    fn test_access_round_trip() {
        let codec = codec();
        let token = codec
            .encode_access(&Claims::for_subject("alice"))
            .expect("Failed to encode token");

        let decoded = codec.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded.subject(), Some("alice"));

        let now = Utc::now().timestamp();
        let exp = decoded.exp.unwrap();
        assert!(exp > now);
        assert!(exp <= now + Duration::minutes(30).num_seconds());
    }

    #[test]
    fn test_refresh_outlives_access() {
        let codec = codec();
        let claims = Claims::for_subject("alice");

        let access = codec.decode(&codec.encode_access(&claims).unwrap()).unwrap();
        let refresh = codec.decode(&codec.encode_refresh(&claims).unwrap()).unwrap();

        assert_eq!(
            refresh.exp.unwrap() - refresh.iat.unwrap(),
            Duration::days(7).num_seconds()
        );
        assert!(refresh.exp.unwrap() > access.exp.unwrap());
    }

    #[test]
    fn test_caller_claims_not_mutated() {
        let codec = codec();
        let claims = Claims::for_subject("alice");

        codec.encode_access(&claims).unwrap();

        assert!(claims.exp.is_none());
        assert!(claims.iat.is_none());
        assert!(claims.jti.is_none());
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let codec = codec();
        let claims = Claims::for_subject("alice");

        let first = codec.encode_refresh(&claims).unwrap();
        let second = codec.encode_refresh(&claims).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let token = codec
            .encode_with_ttl(&Claims::for_subject("alice"), Duration::seconds(-5))
            .unwrap();

        assert_eq!(codec.decode(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_token_expiring_now_is_expired() {
        let codec = codec();
        let token = codec
            .encode_with_ttl(&Claims::for_subject("alice"), Duration::zero())
            .unwrap();

        assert_eq!(codec.decode(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let codec = codec();
        let result =
            codec.encode_with_ttl(&Claims::for_subject("alice"), Duration::days(100_000_000));

        assert!(matches!(result, Err(JwtError::EncodingFailed(_))));
    }

    #[test]
    fn test_tampered_signature() {
        let codec = codec();
        let token = codec.encode_access(&Claims::for_subject("alice")).unwrap();

        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut bytes = signature.as_bytes().to_vec();
        bytes[0] = if bytes[0] == b'A' { b'B' } else { b'A' };
        let tampered = format!("{}.{}", head, String::from_utf8(bytes).unwrap());

        assert!(matches!(
            codec.decode(&tampered),
            Err(JwtError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_garbage_token() {
        let codec = codec();
        assert!(matches!(
            codec.decode("not-a-token"),
            Err(JwtError::TokenInvalid(_))
        ));
    }
}

use std::env;

use auth::TokenConfig;
use auth::TokenConfigError;
use chrono::TimeDelta;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use secrecy::SecretString;
use serde::Deserialize;

/// Application configuration for auth-service.
///
/// The token settings keep the flat names they have in the environment
/// (`SECRET_KEY`, `ALGORITHM`, `ACCESS_TOKEN_EXPIRE_MINUTES`,
/// `REFRESH_TOKEN_EXPIRE_DAYS`). Nested sections use `__` as separator.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub secret_key: SecretString,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
}

/// HTTP server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// PostgreSQL database configuration.
///
/// Without a URL the service falls back to the in-memory store.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    fn default_max_connections() -> u32 {
        5
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: Self::default_max_connections(),
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides.
    ///
    /// # Configuration Priority (highest to lowest)
    /// 1. Environment variables (SECRET_KEY, SERVER__HTTP_PORT, DATABASE__URL, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    ///
    /// # Errors
    /// Returns error if required configuration values are missing or invalid
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url,
            // SECRET_KEY overrides secret_key
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        ConfigBuilder::builder()
            .set_default("server.http_port", 8000_i64)?
            .set_default("algorithm", "HS256")?
            .set_default("access_token_expire_minutes", 30_i64)?
            .set_default("refresh_token_expire_days", 7_i64)
    }

    /// Validated token settings for the codec.
    ///
    /// # Errors
    /// * `UnknownAlgorithm` / `UnsupportedAlgorithm` - `ALGORITHM` is not HS256, HS384 or HS512
    /// * `EmptySecret` - `SECRET_KEY` is empty
    /// * `NonPositiveTtl` - A token lifetime is zero or negative
    /// * `TtlOutOfRange` - A token lifetime is too large to turn into an expiry
    pub fn token_config(&self) -> Result<TokenConfig, TokenConfigError> {
        let algorithm = TokenConfig::parse_algorithm(&self.algorithm)?;

        let access_ttl = TimeDelta::try_minutes(self.access_token_expire_minutes).ok_or(
            TokenConfigError::TtlOutOfRange {
                name: "access_token_expire_minutes",
            },
        )?;
        let refresh_ttl = TimeDelta::try_days(self.refresh_token_expire_days).ok_or(
            TokenConfigError::TtlOutOfRange {
                name: "refresh_token_expire_days",
            },
        )?;

        TokenConfig::new(self.secret_key.clone(), algorithm, access_ttl, refresh_ttl)
    }
}

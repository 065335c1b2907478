//! Session token and credential primitives.
//!
//! Pure building blocks for an authentication service:
//! - Password hashing (Argon2id, PHC strings, salted per call)
//! - JWT signing and verification over a symmetric HMAC secret
//! - A token codec issuing short-lived access and long-lived refresh tokens
//!
//! Nothing here performs I/O. Services own storage and orchestration and call
//! into these types.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Access and Refresh Tokens
//! ```
//! use auth::{Algorithm, Claims, TokenCodec, TokenConfig};
//! use chrono::Duration;
//! use secrecy::SecretString;
//!
//! let config = TokenConfig::new(
//!     SecretString::new("secret_key_at_least_32_bytes_long!".to_string()),
//!     Algorithm::HS256,
//!     Duration::minutes(30),
//!     Duration::days(7),
//! )
//! .unwrap();
//! let codec = TokenCodec::new(&config);
//!
//! let access = codec.encode_access(&Claims::for_subject("alice")).unwrap();
//! let claims = codec.decode(&access).unwrap();
//! assert_eq!(claims.subject(), Some("alice"));
//! ```

pub mod config;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use config::TokenConfig;
pub use config::TokenConfigError;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenCodec;
pub use jsonwebtoken::Algorithm;
pub use password::PasswordError;
pub use password::PasswordHasher;

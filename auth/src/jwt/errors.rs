use thiserror::Error;

/// Error type for JWT operations.
///
/// Decoding failures are split in two: `TokenExpired` when the signature is
/// valid but `exp` has passed, `TokenInvalid` for everything else (bad
/// signature, wrong algorithm, malformed structure, missing `exp`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid: {0}")]
    TokenInvalid(String),

    #[error("Token is expired")]
    TokenExpired,
}

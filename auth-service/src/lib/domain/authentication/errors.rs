use thiserror::Error;

/// Error reported by a credential store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the insert.
    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for all authentication operations.
///
/// Display strings are what callers see. Variants carrying detail keep it for
/// logs only; see the HTTP mapping.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("User already exists")]
    UserExists,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Expired refresh token")]
    ExpiredRefreshToken,

    #[error("Invalid or expired access token")]
    InvalidAccessToken,

    // Infrastructure errors
    #[error("Storage unavailable")]
    StorageUnavailable(String),

    #[error("Internal error")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => {
                AuthError::Internal(format!("Unexpected conflict: {}", msg))
            }
            StoreError::Unavailable(msg) => AuthError::StorageUnavailable(msg),
        }
    }
}

impl From<auth::PasswordError> for AuthError {
    fn from(err: auth::PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

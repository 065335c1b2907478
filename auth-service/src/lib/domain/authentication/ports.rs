use async_trait::async_trait;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::errors::StoreError;
use crate::domain::authentication::models::RefreshTokenRecord;
use crate::domain::authentication::models::TokenPair;
use crate::domain::authentication::models::User;
use crate::domain::authentication::models::Username;

/// Port for authentication operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `username` - Username, matched exactly
    /// * `password` - Plaintext password (hashed before storage)
    ///
    /// # Returns
    /// Created user entity. No token is issued.
    ///
    /// # Errors
    /// * `UserExists` - Username is already taken, including a lost insert race
    /// * `StorageUnavailable` - Store could not be reached
    async fn register(&self, username: &str, password: &str) -> Result<User, AuthError>;

    /// Verify credentials and issue an access/refresh token pair.
    ///
    /// The refresh token is recorded in the store before returning.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password (indistinguishable)
    /// * `StorageUnavailable` - Store could not be reached
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Mint a new access token from a previously issued refresh token.
    ///
    /// The refresh token itself is not rotated.
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - Token was never issued, or fails verification
    /// * `ExpiredRefreshToken` - Token was issued but has expired
    /// * `StorageUnavailable` - Store could not be reached
    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;

    /// Resolve the username an access token was issued to.
    ///
    /// # Errors
    /// * `InvalidAccessToken` - Token is invalid or expired
    async fn resolve_current_user(&self, access_token: &str) -> Result<String, AuthError>;

    /// Greeting served behind the access-token gate.
    fn protected_access(&self, username: &str) -> String;
}

/// Persistence operations for users and issued refresh tokens.
///
/// Implementations must enforce username and token uniqueness themselves and
/// report violations as `StoreError::Conflict`.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve user by username (exact, case-sensitive match).
    ///
    /// # Errors
    /// * `Unavailable` - Storage operation failed
    async fn find_user(&self, username: &Username) -> Result<Option<User>, StoreError>;

    /// Persist a new user.
    ///
    /// # Errors
    /// * `Conflict` - Username is already taken
    /// * `Unavailable` - Storage operation failed
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    /// Retrieve an issued refresh token by exact string match.
    ///
    /// # Errors
    /// * `Unavailable` - Storage operation failed
    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Record an issued refresh token.
    ///
    /// # Errors
    /// * `Conflict` - Token string already recorded
    /// * `Unavailable` - Storage operation failed
    async fn insert_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError>;
}

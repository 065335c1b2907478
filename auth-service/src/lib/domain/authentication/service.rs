use std::sync::Arc;

use async_trait::async_trait;
use auth::Claims;
use auth::JwtError;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenConfig;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::errors::StoreError;
use crate::domain::authentication::models::RefreshTokenRecord;
use crate::domain::authentication::models::TokenPair;
use crate::domain::authentication::models::User;
use crate::domain::authentication::models::Username;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::authentication::ports::CredentialStore;

/// Domain service implementation for authentication.
///
/// Holds no mutable state: the store handle, the codec built from the startup
/// [`TokenConfig`], and a stateless hasher. Calls are independent and safe to
/// run concurrently.
pub struct AuthService<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    token_codec: TokenCodec,
    password_hasher: PasswordHasher,
}

impl<S> AuthService<S>
where
    S: CredentialStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential store implementation
    /// * `token_config` - Signing secret, algorithm, and token lifetimes
    pub fn new(store: Arc<S>, token_config: &TokenConfig) -> Self {
        Self {
            store,
            token_codec: TokenCodec::new(token_config),
            password_hasher: PasswordHasher::new(),
        }
    }

    // Argon2 blocks; run it on the blocking pool.
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.password_hasher;
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(AuthError::from)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.password_hasher;
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))
    }

    fn issue_access_token(&self, subject: &str) -> Result<String, AuthError> {
        self.token_codec
            .encode_access(&Claims::for_subject(subject))
            .map_err(token_issuance_failed)
    }
}

fn token_issuance_failed(err: JwtError) -> AuthError {
    AuthError::Internal(format!("Token issuance failed: {}", err))
}

#[async_trait]
impl<S> AuthServicePort for AuthService<S>
where
    S: CredentialStore,
{
    async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = Username::new(username);

        if self.store.find_user(&username).await?.is_some() {
            tracing::info!(username = %username, "Registration rejected: user exists");
            return Err(AuthError::UserExists);
        }

        let password_hash = self.hash_password(password).await?;

        match self
            .store
            .insert_user(User::new(username.clone(), password_hash))
            .await
        {
            Ok(user) => {
                tracing::info!(username = %user.username, user_id = %user.id, "User registered");
                Ok(user)
            }
            // Another registration won the race between lookup and insert.
            Err(StoreError::Conflict(_)) => {
                tracing::info!(username = %username, "Registration rejected: concurrent insert");
                Err(AuthError::UserExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let username = Username::new(username);

        let Some(user) = self.store.find_user(&username).await? else {
            tracing::info!(username = %username, "Login failed");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_password(password, &user.password_hash)
            .await?
        {
            tracing::info!(username = %username, "Login failed");
            return Err(AuthError::InvalidCredentials);
        }

        let claims = Claims::for_subject(user.username.as_str());
        let access_token = self
            .token_codec
            .encode_access(&claims)
            .map_err(token_issuance_failed)?;
        let refresh_token = self
            .token_codec
            .encode_refresh(&claims)
            .map_err(token_issuance_failed)?;

        self.store
            .insert_refresh_token(RefreshTokenRecord::new(
                refresh_token.clone(),
                user.username.clone(),
            ))
            .await?;

        tracing::info!(username = %user.username, "Login succeeded");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let Some(record) = self.store.find_refresh_token(refresh_token).await? else {
            tracing::info!("Refresh rejected: token was never issued");
            return Err(AuthError::InvalidRefreshToken);
        };

        let claims = self.token_codec.decode(refresh_token).map_err(|e| {
            tracing::info!(username = %record.username, error = %e, "Refresh rejected");
            match e {
                JwtError::TokenExpired => AuthError::ExpiredRefreshToken,
                _ => AuthError::InvalidRefreshToken,
            }
        })?;

        let subject = claims.subject().ok_or(AuthError::InvalidRefreshToken)?;
        if subject != record.username.as_str() {
            tracing::warn!(
                username = %record.username,
                "Refresh rejected: token subject does not match its owner"
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        let access_token = self.issue_access_token(subject)?;
        tracing::debug!(username = %subject, "Access token refreshed");

        Ok(access_token)
    }

    async fn resolve_current_user(&self, access_token: &str) -> Result<String, AuthError> {
        let claims = self.token_codec.decode(access_token).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AuthError::InvalidAccessToken
        })?;

        claims
            .sub
            .ok_or(AuthError::InvalidAccessToken)
    }

    fn protected_access(&self, username: &str) -> String {
        format!("Hello {}", username)
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::authentication::errors::StoreError;
use crate::domain::authentication::models::RefreshTokenRecord;
use crate::domain::authentication::models::User;
use crate::domain::authentication::models::Username;
use crate::domain::authentication::ports::CredentialStore;

/// Process-local credential store.
///
/// Users are keyed by username and refresh tokens by token string, so both
/// uniqueness rules are enforced under the write lock. Nothing survives a
/// restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    refresh_tokens: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of refresh tokens recorded so far.
    pub async fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_user(&self, username: &Username) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(username.as_str()).cloned())
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(user.username.as_str()) {
            return Err(StoreError::Conflict(user.username.to_string()));
        }

        users.insert(user.username.as_str().to_string(), user.clone());
        tracing::debug!("User {} stored in memory", user.id);

        Ok(user)
    }

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self.refresh_tokens.read().await.get(token).cloned())
    }

    async fn insert_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError> {
        let mut refresh_tokens = self.refresh_tokens.write().await;

        if refresh_tokens.contains_key(&record.token) {
            return Err(StoreError::Conflict("refresh token".to_string()));
        }

        refresh_tokens.insert(record.token.clone(), record);
        Ok(())
    }
}

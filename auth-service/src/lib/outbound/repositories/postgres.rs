use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::authentication::errors::StoreError;
use crate::domain::authentication::models::RefreshTokenRecord;
use crate::domain::authentication::models::User;
use crate::domain::authentication::models::UserId;
use crate::domain::authentication::models::Username;
use crate::domain::authentication::ports::CredentialStore;

/// PostgreSQL implementation of CredentialStore.
///
/// Uniqueness comes from the `users_username_key` and
/// `refresh_tokens_token_key` constraints (see `migrations/`).
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Create a new PostgreSQL credential store.
    ///
    /// # Arguments
    /// * `pool` - PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(e: sqlx::Error) -> StoreError {
    tracing::error!(error = %e, "Credential store query failed");
    StoreError::Unavailable(e.to_string())
}

fn conflict_or_unavailable(e: sqlx::Error, constraint: &str, key: &str) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(constraint) {
            return StoreError::Conflict(key.to_string());
        }
    }
    unavailable(e)
}

fn username_from_row(row: &PgRow) -> Result<Username, StoreError> {
    let raw: String = row.try_get("username").map_err(unavailable)?;
    Ok(Username::new(raw))
}

fn user_from_row(row: PgRow) -> Result<User, StoreError> {
    let id: Uuid = row.try_get("id").map_err(unavailable)?;
    let password_hash: String = row.try_get("password_hash").map_err(unavailable)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(unavailable)?;

    Ok(User {
        id: UserId(id),
        username: username_from_row(&row)?,
        password_hash,
        created_at,
    })
}

fn refresh_token_from_row(row: PgRow) -> Result<RefreshTokenRecord, StoreError> {
    let id: Uuid = row.try_get("id").map_err(unavailable)?;
    let token: String = row.try_get("token").map_err(unavailable)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(unavailable)?;

    Ok(RefreshTokenRecord {
        id,
        token,
        username: username_from_row(&row)?,
        created_at,
    })
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_user(&self, username: &Username) -> Result<Option<User>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?
        .map(user_from_row)
        .transpose()
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_unavailable(e, "users_username_key", user.username.as_str()))?;

        Ok(user)
    }

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, token, username, created_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?
        .map(refresh_token_from_row)
        .transpose()
    }

    async fn insert_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, token, username, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(&record.token)
        .bind(record.username.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_unavailable(e, "refresh_tokens_token_key", "refresh token"))?;

        tracing::debug!(username = %record.username, "Refresh token recorded");
        Ok(())
    }
}

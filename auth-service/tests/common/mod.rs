#![allow(dead_code)]

use std::sync::Arc;

use auth::Algorithm;
use auth::TokenCodec;
use auth::TokenConfig;
use auth_service::authentication::ports::CredentialStore;
use auth_service::authentication::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::repositories::InMemoryCredentialStore;
use auth_service::repositories::PostgresCredentialStore;
use chrono::Duration;
use secrecy::SecretString;
use serde_json::json;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;

const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp<S = InMemoryCredentialStore> {
    pub address: String,
    pub port: u16,
    pub store: Arc<S>,
    pub api_client: reqwest::Client,
    pub token_codec: TokenCodec,
}

/// Test database helper
///
/// Each instance owns a fresh, migrated database created on the server named
/// by `DATABASE__URL`.
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    admin_url: String,
}

pub fn test_token_config() -> TokenConfig {
    TokenConfig::new(
        SecretString::new(TEST_SECRET.to_string()),
        Algorithm::HS256,
        Duration::minutes(30),
        Duration::days(7),
    )
    .expect("Test token config should be valid")
}

impl TestApp {
    /// Spawn the application on the in-memory store
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(InMemoryCredentialStore::new())).await
    }
}

impl TestApp<PostgresCredentialStore> {
    /// Spawn the application on a Postgres store backed by `db`
    pub async fn spawn_with_postgres(db: &TestDb) -> Self {
        Self::spawn_with_store(Arc::new(PostgresCredentialStore::new(db.pool.clone()))).await
    }
}

impl<S: CredentialStore> TestApp<S> {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with_store(store: Arc<S>) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let token_config = test_token_config();
        let auth_service = Arc::new(AuthService::new(Arc::clone(&store), &token_config));

        let router = create_router(auth_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            store,
            api_client: reqwest::Client::new(),
            token_codec: TokenCodec::new(&token_config),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user, asserting success
    pub async fn register(&self, username: &str, password: &str) {
        let response = self
            .post("/register")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    /// Log in, returning the (access_token, refresh_token) pair
    pub async fn login(&self, username: &str, password: &str) -> (String, String) {
        let response = self
            .post("/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

impl TestDb {
    /// Create a new test database with a unique name.
    ///
    /// Returns `None` when `DATABASE__URL` is not set, so Postgres tests are
    /// skipped on machines without a server.
    pub async fn from_env() -> Option<Self> {
        let admin_url = std::env::var("DATABASE__URL").ok()?;

        let db_name = format!(
            "test_auth_service_{}",
            uuid::Uuid::new_v4().to_string().replace('-', "_")
        );

        let mut conn = PgConnection::connect(&admin_url)
            .await
            .expect("Failed to connect to Postgres");

        // Create test database
        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        // Connect to the new test database
        let options = admin_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE__URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pool,
            db_name,
            admin_url,
        })
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        // Database cleanup happens asynchronously
        let db_name = self.db_name.clone();
        let admin_url = self.admin_url.clone();
        tokio::spawn(async move {
            if let Ok(mut conn) = PgConnection::connect(&admin_url).await {
                // Terminate existing connections
                let _ = conn
                    .execute(
                        format!(
                            r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                            db_name
                        )
                        .as_str(),
                    )
                    .await;

                // Drop database
                let _ = conn
                    .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, db_name).as_str())
                    .await;
            }
        });
    }
}

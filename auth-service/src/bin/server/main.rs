use std::sync::Arc;

use auth_service::authentication::ports::AuthServicePort;
use auth_service::authentication::service::AuthService;
use auth_service::config::Config;
use auth_service::inbound::http::router::create_router;
use auth_service::repositories::InMemoryCredentialStore;
use auth_service::repositories::PostgresCredentialStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let token_config = config.token_config()?;

    tracing::info!(
        http_port = config.server.http_port,
        algorithm = %config.algorithm,
        access_token_expire_minutes = config.access_token_expire_minutes,
        refresh_token_expire_days = config.refresh_token_expire_days,
        persistent_store = config.database.url.is_some(),
        "Configuration loaded"
    );

    if token_config.refresh_ttl() < token_config.access_ttl() {
        tracing::warn!("Refresh tokens expire before the access tokens they renew");
    }

    let auth_service: Arc<dyn AuthServicePort> = match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let store = Arc::new(PostgresCredentialStore::new(pg_pool));
            Arc::new(AuthService::new(store, &token_config))
        }
        None => {
            tracing::warn!("DATABASE__URL not set; credentials are kept in memory only");
            let store = Arc::new(InMemoryCredentialStore::new());
            Arc::new(AuthService::new(store, &token_config))
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(auth_service)).await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

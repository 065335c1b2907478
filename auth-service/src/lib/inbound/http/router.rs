use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::login::login;
use super::handlers::protected::protected;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::status::status;
use super::middleware::authenticate as auth_middleware;
use crate::domain::authentication::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
}

pub fn create_router(auth_service: Arc<dyn AuthServicePort>) -> Router {
    let state = AppState { auth_service };

    let public_routes = Router::new()
        .route("/", get(status))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh));

    let protected_routes = Router::new()
        .route("/protected", get(protected))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Query strings are left out of the span: /refresh may carry a token there.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::http::header;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use mockall::mock;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::authentication::errors::AuthError;
    use crate::domain::authentication::models::TokenPair;
    use crate::domain::authentication::models::User;

    mock! {
        pub TestAuthService {}

        #[async_trait]
        impl AuthServicePort for TestAuthService {
            async fn register(&self, username: &str, password: &str) -> Result<User, AuthError>;
            async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError>;
            async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;
            async fn resolve_current_user(&self, access_token: &str) -> Result<String, AuthError>;
            fn protected_access(&self, username: &str) -> String;
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_route() {
        let router = create_router(Arc::new(MockTestAuthService::new()));

        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, "JWT Authentication Service Running");
    }

    #[tokio::test]
    async fn test_register_storage_unavailable() {
        let mut service = MockTestAuthService::new();
        service
            .expect_register()
            .times(1)
            .returning(|_, _| Err(AuthError::StorageUnavailable("pool closed".to_string())));

        let response = create_router(Arc::new(service))
            .oneshot(
                Request::post("/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"bob","password":"pw1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["detail"], "Storage unavailable");
    }

    #[tokio::test]
    async fn test_malformed_body_uses_detail_shape() {
        let mut service = MockTestAuthService::new();
        service.expect_login().times(0);

        let response = create_router(Arc::new(service))
            .oneshot(
                Request::post("/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"bob"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_refresh_token_from_json_body() {
        let mut service = MockTestAuthService::new();
        service
            .expect_refresh()
            .withf(|token| token == "body-token")
            .times(1)
            .returning(|_| Ok("new-access".to_string()));

        let response = create_router(Arc::new(service))
            .oneshot(
                Request::post("/refresh")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"refresh_token":"body-token"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["access_token"], "new-access");
    }

    #[tokio::test]
    async fn test_refresh_without_token() {
        let mut service = MockTestAuthService::new();
        service.expect_refresh().times(0);

        let response = create_router(Arc::new(service))
            .oneshot(Request::post("/refresh").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_protected_passes_resolved_user() {
        let mut service = MockTestAuthService::new();
        service
            .expect_resolve_current_user()
            .withf(|token| token == "good-token")
            .times(1)
            .returning(|_| Ok("bob".to_string()));
        service
            .expect_protected_access()
            .withf(|username| username == "bob")
            .times(1)
            .returning(|username| format!("Hello {}", username));

        let response = create_router(Arc::new(service))
            .oneshot(
                Request::get("/protected")
                    .header(header::AUTHORIZATION, "Bearer good-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Hello bob");
    }

    #[tokio::test]
    async fn test_protected_missing_header() {
        let mut service = MockTestAuthService::new();
        service.expect_resolve_current_user().times(0);

        let response = create_router(Arc::new(service))
            .oneshot(Request::get("/protected").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}

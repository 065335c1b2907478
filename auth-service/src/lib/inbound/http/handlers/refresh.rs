use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Exchange a refresh token for a new access token.
///
/// The token is read from the `refresh_token` query parameter, falling back to
/// a JSON body `{"refresh_token": "..."}`.
pub async fn refresh(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
    body: Option<Json<RefreshParams>>,
) -> Result<ApiSuccess<RefreshResponseData>, ApiError> {
    let refresh_token = params
        .refresh_token
        .or_else(|| body.and_then(|Json(body)| body.refresh_token))
        .ok_or_else(|| ApiError::UnprocessableEntity("Missing refresh_token".to_string()))?;

    state
        .auth_service
        .refresh(&refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|access_token| ApiSuccess::new(StatusCode::OK, RefreshResponseData { access_token }))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshParams {
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub access_token: String,
}

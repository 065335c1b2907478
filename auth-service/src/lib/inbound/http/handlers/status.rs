use axum::Json;

pub const STATUS_MESSAGE: &str = "JWT Authentication Service Running";

/// Liveness message, encoded as a JSON string.
pub async fn status() -> Json<&'static str> {
    Json(STATUS_MESSAGE)
}

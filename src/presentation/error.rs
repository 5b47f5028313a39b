// Boundary errors for HTTP handlers
use crate::domain::service::{UnknownService, UnknownStatus};
use crate::domain::telemetry::MAX_INTERVAL_SECS;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    UnknownService(#[from] UnknownService),

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),

    #[error("interval must be between 1 and {} seconds", MAX_INTERVAL_SECS)]
    InvalidInterval,

    #[error("failed to encode response")]
    Encoding(StatusCode),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownService(_) | ApiError::UnknownStatus(_) | ApiError::InvalidInterval => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Encoding(status) => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(%status, "Request failed: {}", self);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

//! Error types for the monitor web interface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use monitor_core::EngineError;
use thiserror::Error;

/// Errors that can occur while serving a request.
#[derive(Debug, Error)]
pub enum WebError {
    /// A required parameter is missing.
    #[error("{0}")]
    BadRequest(&'static str),

    /// The transcript sources could not answer.
    #[error("Transcript sources unavailable: {0}")]
    Engine(#[from] EngineError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Engine(err) => {
                tracing::error!("Aggregation failed: {}", err);
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, WebError>;

//! JSON error responses for the HTTP routes
//!
//! Every error body is an object with a stable `error` discriminator:
//! - `missing_url`: stream requested without a `url` query parameter
//! - `not_found`: unknown article id
//! - `api_error`: admin upstream answered with an error status (relayed as-is)
//! - `connection_failed`: admin upstream unreachable or unreadable
//! - `internal_error`: anything the server itself failed at

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

/// Errors returned to HTTP clients
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("missing required query parameter 'url'")]
    MissingUrl,

    #[error("article {0} not found")]
    NotFound(i64),

    /// Upstream returned an HTTP error status
    #[error("upstream returned HTTP {status}")]
    Api { status: u16 },

    /// Network-level failure talking to upstream
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Api { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::ConnectionFailed(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Value of the `error` key
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingUrl => "missing_url",
            ApiError::NotFound(_) => "not_found",
            ApiError::Api { .. } => "api_error",
            ApiError::ConnectionFailed(_) => "connection_failed",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ApiError::MissingUrl => json!({
                "error": self.kind(),
                "details": self.to_string(),
            }),
            ApiError::NotFound(id) => json!({"error": self.kind(), "id": id}),
            ApiError::Api { status } => json!({"error": self.kind(), "status": status}),
            ApiError::ConnectionFailed(details) | ApiError::Internal(details) => json!({
                "error": self.kind(),
                "details": details,
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(_) | ApiError::ConnectionFailed(_) => {
                tracing::error!(error_type = self.kind(), error_message = %self, "Request failed");
            }
            _ => {
                tracing::debug!(error_type = self.kind(), error_message = %self, "Request rejected");
            }
        }
        (self.status(), Json(self.body())).into_response()
    }
}

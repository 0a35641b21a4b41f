//! Structured error types for API responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

/// JSON body carried by every failing response the service shapes itself.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field is missing, empty, or not a string.
    #[error("Missing required fields")]
    MissingFields,

    /// No task row matches the requested id.
    #[error("Task not found")]
    TaskNotFound,

    /// The request body never deserialized as JSON; axum's own response
    /// is passed through unchanged.
    #[error(transparent)]
    BodyRejection(#[from] JsonRejection),

    /// Store-level failure.
    #[error("{0}")]
    Database(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields => StatusCode::BAD_REQUEST,
            ApiError::TaskNotFound => StatusCode::NOT_FOUND,
            ApiError::BodyRejection(rejection) => rejection.status(),
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BodyRejection(rejection) => rejection.into_response(),
            ApiError::Database(e) => {
                error!("Store operation failed: {}", e);
                let body = ErrorBody {
                    error: e.to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            other => {
                let body = ErrorBody {
                    error: other.to_string(),
                };
                (other.status(), Json(body)).into_response()
            }
        }
    }
}

/// Convenience alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;

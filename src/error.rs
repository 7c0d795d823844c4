//! Error types for the image job service
//!
//! Pool-level, storage, operation and HTTP errors, using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Dispatch Error ==
/// Returned when the pool could not produce an answer at all.
///
/// A job that ran and failed is not an error here; it comes back as a failed
/// `JobResult`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The pool is stopping or stopped and accepts no new jobs
    #[error("worker pool is shutting down")]
    ShuttingDown,

    /// `start` has not been called yet
    #[error("worker pool is not running")]
    NotRunning,

    /// The caller stopped waiting; the job may still run
    #[error("job processing timeout ({0:?})")]
    Timeout(Duration),

    /// The pool finished shutting down while the caller was waiting
    #[error("worker pool shutdown while processing")]
    ShutdownWhileWaiting,

    /// Fire-and-forget submission was removed
    #[error("fire-and-forget submission is not supported, use submit_and_wait")]
    SubmitUnsupported,
}

// == Storage Error ==
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("invalid image key: {0:?}")]
    InvalidKey(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode processing record: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Operation Error ==
/// Failure raised while validating parameters or running a transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("invalid type for parameter {name}: expected {expected}, got {found}")]
    InvalidParameterType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid value for parameter {name}: {reason}")]
    InvalidParameterValue { name: String, reason: String },

    #[error("failed to decode image from bytes: {0}")]
    Decode(String),

    #[error("failed to save processed image: {0}")]
    Save(String),

    #[error("operation panicked: {0}")]
    Panicked(String),
}

// == API Error ==
/// Unified error type for the HTTP surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or incomplete request
    #[error("{0}")]
    InvalidRequest(String),

    /// The pool could not return an answer
    #[error("Processing failed")]
    Unavailable(#[from] DispatchError),

    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Unavailable(err) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": "Processing failed", "message": err.to_string() }),
            ),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

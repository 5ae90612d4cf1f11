//! Error types for firmforge-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use firmforge_core::{JobError, StoreError};
use serde::Serialize;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Workspace storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(m)
            | ApiError::BadRequest(m)
            | ApiError::Conflict(m)
            | ApiError::Internal(m) => m,
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::UnknownTarget(board) => ApiError::BadRequest(format!(
                "Unsupported board: {}. Use GET /boards to see supported boards.",
                board
            )),
            e @ (JobError::MissingEntryPoint | JobError::InvalidFileName(_)) => {
                ApiError::BadRequest(e.to_string())
            }
            JobError::NotFound(msg) => ApiError::NotFound(msg),
            e @ JobError::Abandoned(_) => ApiError::Conflict(e.to_string()),
            e @ (JobError::Resource(_) | JobError::Store(_)) => {
                tracing::error!(error = %e, "Job operation failed");
                ApiError::Internal(e.to_string())
            }
        }
    }
}

/// Error response body
///
/// `detail` repeats the message under the key older clients read.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = self.message().to_string();
        let body = ErrorResponse {
            error: message.clone(),
            code: code.to_string(),
            detail: message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;
    use firmforge_types::JobId;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::NotFound("test".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("test".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("test".to_string()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal("test".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_job_error_mapping() {
        match ApiError::from(JobError::UnknownTarget("foo".to_string())) {
            ApiError::BadRequest(msg) => assert_eq!(
                msg,
                "Unsupported board: foo. Use GET /boards to see supported boards."
            ),
            other => panic!("unexpected: {other:?}"),
        }

        assert!(matches!(
            ApiError::from(JobError::MissingEntryPoint),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(JobError::NotFound("Job not found or expired".to_string())),
            ApiError::NotFound(msg) if msg == "Job not found or expired"
        ));
        assert!(matches!(
            ApiError::from(JobError::Resource("disk full".to_string())),
            ApiError::Internal(_)
        ));
        assert!(matches!(
            ApiError::from(JobError::Abandoned(JobId::generate())),
            ApiError::Conflict(_)
        ));
    }
}

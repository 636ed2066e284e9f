//! Error type system for the customer API
//!
//! Every failure a request can hit ends up as an [`ApiError`], which knows its
//! HTTP status and renders itself as a plain-text response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Main error type for the customer API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Credential errors
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    // Request errors
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Task error: {0}")]
    Task(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_)
            | ApiError::Database(_)
            | ApiError::Pool(_)
            | ApiError::Task(_)
            | ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error kind name used in log records
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Internal(_) => "InternalError",
            ApiError::Database(_) => "DatabaseError",
            ApiError::Pool(_) => "PoolError",
            ApiError::Task(_) => "TaskError",
            ApiError::Serialization(_) => "SerializationError",
        }
    }

    /// Re-tag any error as a 400, keeping its message.
    ///
    /// Create and update report every collaborator failure as a bad request.
    pub fn into_bad_request(self) -> Self {
        match self {
            ApiError::BadRequest(_) => self,
            other => ApiError::BadRequest(other.to_string()),
        }
    }

    /// Re-tag an error as a 500, keeping its message.
    pub fn into_internal(self) -> Self {
        match self {
            ApiError::Internal(_) => self,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(
                error_type = self.error_type(),
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::warn!(
                error_type = self.error_type(),
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        (status_code, self.to_string()).into_response()
    }
}

/// Result type alias for operations that can fail with ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::Unauthorized("missing".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("invalid".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::BadRequest("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Database(rusqlite::Error::InvalidQuery).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Task("panicked".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_request_errors_display_bare_message() {
        let err = ApiError::BadRequest("duplicate id or email not allowed".into());
        assert_eq!(err.to_string(), "duplicate id or email not allowed");
    }

    #[test]
    fn test_into_bad_request_keeps_message() {
        let err = ApiError::Pool("timed out".into()).into_bad_request();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_into_internal() {
        let err = ApiError::NotFound("nothing".into()).into_internal();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "nothing");
    }

    #[tokio::test]
    async fn test_error_renders_plain_text() {
        let response = ApiError::Forbidden("API Key is invalid".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"API Key is invalid");
    }
}

//! Error types for the cache store and gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

// == Cache Error Enum ==
/// Unified error type for the cache store and gateway.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is empty or too long to be stored
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key not found in cache, or only present as a stale entry
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The backend behind the gateway failed
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    fn status_code(&self) -> StatusCode {
        match self {
            CacheError::InvalidKey(_)
            | CacheError::InvalidRequest(_)
            | CacheError::Upstream(UpstreamError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Upstream(UpstreamError::Status { status, .. })
                if status.is_client_error() =>
            {
                *status
            }
            CacheError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache store and gateway.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CacheError::InvalidKey(String::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CacheError::NotFound("k".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CacheError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_client_error_passes_through() {
        let err = CacheError::from(UpstreamError::Status {
            status: StatusCode::FORBIDDEN,
            body: "bad api key".into(),
        });
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_upstream_server_error_is_bad_gateway() {
        let err = CacheError::from(UpstreamError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_path_outside_backend_is_bad_request() {
        let err = CacheError::from(UpstreamError::InvalidPath("../admin".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_body_is_json() {
        let response = CacheError::NotFound("companies".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error ==
/// Failure reported by a persistent key/value store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend I/O failed
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend contents could not be encoded or decoded
    #[error("Store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Backend refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// == Cache Error ==
/// Failure surfaced by write-side cache operations.
///
/// Read-side failures never reach callers; they are logged and treated as a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The underlying store rejected a write or removal
    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),

    /// The value could not be serialized into a cache entry
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Remote Error ==
/// Failure of a call to the remote market data API.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The request never produced a response (connect, timeout, TLS, ...)
    #[error("Request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success HTTP status
    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The API reported an error inside a 200 response body
    #[error("API error: {0}")]
    Api(String),

    /// The body could not be decoded into the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RemoteError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => RemoteError::Malformed(err.to_string()),
            None => RemoteError::Transport(err.to_string()),
        }
    }
}

// == API Error ==
/// Error type returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Remote fetch failed and no cached copy was available
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A cache maintenance operation failed
    #[error(transparent)]
    Cache(#[from] CacheError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Remote(_) => StatusCode::BAD_GATEWAY,
            ApiError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T, E = CacheError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_maps_to_bad_gateway() {
        let response = ApiError::from(RemoteError::Transport("timeout".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let response = ApiError::InvalidRequest("empty symbol".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_cache_error_maps_to_internal_error() {
        let err = CacheError::Store(StoreError::Unavailable("disk full".to_string()));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_remote_error_message_preserved() {
        let err = RemoteError::Status {
            status: 503,
            message: "service unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Unexpected status 503: service unavailable");
        let api: ApiError = err.into();
        assert_eq!(api.to_string(), "Unexpected status 503: service unavailable");
    }
}

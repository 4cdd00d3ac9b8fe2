//! Error types for the storefront cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Internal error type for the cache core and the product store.
///
/// Public read and invalidation functions never return this; they log it and
/// fall back to a sentinel value instead.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The remote backend answered with an error or an unexpected reply
    #[error("Backend error: {0}")]
    Backend(String),

    /// Transport failure talking to the remote backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File-system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored binary payload is not valid base64
    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// A category, id or file name is not a single safe path component
    #[error("Invalid path segment: {0}")]
    InvalidPath(String),
}

// == Api Error Enum ==
/// Errors surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or wrong admin token
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::InvalidPath(segment) => {
                ApiError::InvalidRequest(format!("Invalid path segment: {}", segment))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache core.
pub type Result<T> = std::result::Result<T, CacheError>;

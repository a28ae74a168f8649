//! Error types for the stat engine
//!
//! Provides one thiserror enum per concern plus the HTTP-facing `ApiError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Transient Error ==
/// Failure of a single HTTP attempt that is worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransientError {
    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Connection could not be established or was dropped
    #[error("connection error: {0}")]
    Connect(String),

    /// Server answered with a retryable status (5xx, 408, 429)
    #[error("server responded with status {0}")]
    Status(u16),

    /// Response body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),
}

// == Fetch Error ==
/// Terminal outcome of a logical fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The entity does not exist at the source. Never retried.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Every attempt failed transiently
    #[error("request to {url} failed after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: TransientError,
    },

    /// Non-retryable client error other than not-found
    #[error("request to {url} rejected with status {status}")]
    Rejected { url: String, status: u16 },
}

// == Cache Error ==
/// Local disk failure in the content cache.
///
/// Callers log these and fall through to the network.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Reading or writing a cache file failed
    #[error("cache io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The metadata index could not be encoded or decoded
    #[error("cache index error: {0}")]
    Index(#[from] serde_json::Error),

    /// Key is empty or would escape the cache directory
    #[error("invalid cache key: {0:?}")]
    InvalidKey(String),
}

impl CacheError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

// == Formula Error ==
/// Evaluation failures. A parse miss is `None`, not an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    /// Level outside the game's leveling range
    #[error("level {level} is outside the valid range 1..=18")]
    OutOfRange { level: u32 },

    /// Range whose start lies after its end
    #[error("invalid level range {start}..={end}")]
    InvalidRange { start: u32, end: u32 },

    /// Formula holds a non-finite number
    #[error("malformed formula: {0}")]
    Malformed(String),
}

// == API Error ==
/// Unified error type for the HTTP front-end.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Fetching the entity page failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Evaluating a formula failed
    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// Named stat is absent from the entity page
    #[error("stat not found: {0}")]
    StatNotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Fetch(FetchError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ApiError::Formula(FormulaError::Malformed(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Formula(_) => StatusCode::BAD_REQUEST,
            ApiError::StatNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

//! Error types for remote data access.

use thiserror::Error;

/// Errors raised while building requests or fetching data.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The request is malformed; nothing was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Connection, timeout or body transfer failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be interpreted.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    NetCdf(#[from] netcdf_parser::NetCdfError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AccessError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        AccessError::InvalidRequest(msg.into())
    }
}

/// Result type for data access operations.
pub type AccessResult<T> = Result<T, AccessError>;

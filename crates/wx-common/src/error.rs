//! Error types shared across the gallery crates.

use thiserror::Error;

/// Result type alias using WxError.
pub type WxResult<T> = Result<T, WxError>;

/// Errors raised by the shared data model.
#[derive(Debug, Error)]
pub enum WxError {
    // === Shape and alignment ===
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Grids are not aligned: {0}")]
    GridMismatch(String),

    #[error("Index out of range: {0}")]
    IndexOutOfRange(String),

    // === Units ===
    #[error("Unit mismatch: expected {expected}, got {actual}")]
    UnitMismatch { expected: String, actual: String },

    #[error("Cannot convert {from} to {to}")]
    UnitConversion { from: String, to: String },

    // === Metadata ===
    #[error("Missing coordinate reference metadata for '{0}'")]
    MissingCrs(String),

    #[error("Missing vertical levels for '{0}'")]
    MissingLevels(String),

    #[error("Invalid grid mapping: {0}")]
    InvalidCrs(String),

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),
}

impl From<serde_json::Error> for WxError {
    fn from(err: serde_json::Error) -> Self {
        WxError::InvalidCrs(format!("JSON error: {}", err))
    }
}

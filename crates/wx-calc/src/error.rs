//! Error types for derived-field calculations.

use thiserror::Error;
use wx_common::WxError;

#[derive(Error, Debug)]
pub enum CalcError {
    /// An input field is in a unit the calculation cannot use.
    #[error("unit mismatch: expected {expected}, got {actual}")]
    UnitMismatch { expected: String, actual: String },

    /// Input fields are not on the same grid.
    #[error("grid mismatch: {0}")]
    GridMismatch(String),

    /// A 3-D calculation received a field without a vertical axis.
    #[error("field '{0}' has no vertical levels")]
    MissingLevels(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Field(WxError),
}

impl CalcError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<WxError> for CalcError {
    fn from(err: WxError) -> Self {
        match err {
            WxError::UnitMismatch { expected, actual } => Self::UnitMismatch { expected, actual },
            WxError::UnitConversion { from, to } => Self::UnitMismatch {
                expected: to,
                actual: from,
            },
            WxError::GridMismatch(msg) => Self::GridMismatch(msg),
            WxError::MissingLevels(name) => Self::MissingLevels(name),
            other => Self::Field(other),
        }
    }
}

pub type CalcResult<T> = Result<T, CalcError>;

//! Error types for map rendering.

use thiserror::Error;
use wx_common::WxError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),

    #[error("Unknown colormap '{0}'")]
    UnknownColormap(String),

    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    #[error("Invalid levels: {0}")]
    InvalidLevels(String),

    /// The layer's data cannot be placed on the map.
    #[error("Cannot draw {layer}: {reason}")]
    Layer { layer: &'static str, reason: String },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Field(#[from] WxError),

    #[error(transparent)]
    Wind(#[from] projection::WindError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub(crate) fn layer(layer: &'static str, reason: impl Into<String>) -> Self {
        RenderError::Layer {
            layer,
            reason: reason.into(),
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

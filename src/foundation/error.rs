use crate::foundation::core::LayerId;

/// Crate-wide result alias.
pub type LoopmaskResult<T> = Result<T, LoopmaskError>;

/// Errors raised by loopmask outside the steady-state render and playback path.
#[derive(thiserror::Error, Debug)]
pub enum LoopmaskError {
    /// Invalid input value (zoom, manifest field, raster dimensions).
    #[error("validation error: {0}")]
    Validation(String),

    /// Animation or mask bytes could not be turned into pixels.
    #[error("decode error: {0}")]
    Decode(String),

    /// A document mutation named a missing or protected layer.
    #[error("layer error: {layer}: {msg}")]
    Layer {
        /// Layer the mutation targeted.
        layer: LayerId,
        /// Why the mutation was refused.
        msg: String,
    },

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure, typically IO with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoopmaskError {
    /// Build a [`LoopmaskError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LoopmaskError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`LoopmaskError::Layer`].
    pub fn layer(layer: LayerId, msg: impl Into<String>) -> Self {
        Self::Layer {
            layer,
            msg: msg.into(),
        }
    }

    /// Build a [`LoopmaskError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

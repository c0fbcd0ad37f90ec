//! Error types for model construction.

use thiserror::Error;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while building a quantized model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A weight or bias table does not match the declared layer shape.
    #[error("{what} size mismatch: got {got}, expected {expected}")]
    ShapeMismatch {
        /// Which table was malformed.
        what: &'static str,
        /// Length actually provided.
        got: usize,
        /// Length the layer shape requires.
        expected: usize,
    },

    /// The hidden-layer rescale divisor must be positive.
    #[error("invalid hidden divisor: {value} (must be >= 1)")]
    InvalidDivisor {
        /// Value that was rejected.
        value: i32,
    },
}

impl ModelError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(what: &'static str, got: usize, expected: usize) -> Self {
        Self::ShapeMismatch {
            what,
            got,
            expected,
        }
    }
}

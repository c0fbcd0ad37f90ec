//! Error types for driver operations.
//!
//! The crossbar arithmetic itself is total — padding absorbs out-of-range
//! tile access, so `compute_tile` and `run_layer` have no failure path.
//! Errors exist only at the resource layer: opening and mapping the
//! peripheral aperture.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, ImcError>;

/// Errors that can occur while acquiring a crossbar backend.
#[derive(Debug, Error)]
pub enum ImcError {
    /// Peripheral aperture not found at the expected path.
    #[error("IMC aperture not found: {path}")]
    DeviceNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// I/O error during device access.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Memory-mapping the peripheral aperture failed.
    #[error("Failed to map IMC aperture: {reason}")]
    MapFailed {
        /// Reason for failure.
        reason: String,
    },
}

impl ImcError {
    /// Create a device not found error.
    pub fn device_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DeviceNotFound { path: path.into() }
    }

    /// Create a map failed error.
    pub fn map_failed(reason: impl Into<String>) -> Self {
        Self::MapFailed {
            reason: reason.into(),
        }
    }
}

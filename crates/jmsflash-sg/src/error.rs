//! Error types for the SCSI-generic backend.

use thiserror::Error;

/// Result type for SG open operations.
pub type Result<T> = std::result::Result<T, SgError>;

/// Errors that can occur while opening the block device.
#[derive(Debug, Error)]
pub enum SgError {
    /// Failed to open the device node
    #[error("failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

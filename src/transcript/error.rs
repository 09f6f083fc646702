//! Error types for the transcript store

use thiserror::Error;

/// Failures while reading or writing the backing file.
///
/// These never reach HTTP callers; the store logs them and keeps serving
/// from memory.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure (missing directory, permissions, disk full)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file content is not a valid transcript map
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

//! Persistence error type.

use thiserror::Error;

/// Errors surfaced by quip store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    /// Scope contents could not be encoded.
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

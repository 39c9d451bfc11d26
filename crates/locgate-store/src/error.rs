//! Error types for the store crate.

use thiserror::Error;

/// Errors that can occur while persisting the access log.
///
/// Reads never fail; only writes surface errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to take the store lock.
    #[error("failed to lock access log: {0}")]
    Lock(#[source] std::io::Error),

    /// Failed to write or replace the backing file.
    #[error("failed to write access log: {0}")]
    Write(#[source] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

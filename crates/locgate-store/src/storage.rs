//! Access log storage backends.

use crate::error::StoreError;
use crate::file::FileStore;
use locgate_core::{AccessLog, StorageConfig};
use std::sync::{Arc, Mutex};

/// Trait for access log storage backends.
///
/// The whole log is read and written as one document. There is no cache
/// between calls: every `load` sees the latest saved state.
pub trait AccessLogStore: Send + Sync {
    /// Read the full access log.
    ///
    /// Missing, empty or malformed storage yields an empty log. This never
    /// fails: a damaged log must not take the gate down.
    fn load(&self) -> AccessLog;

    /// Replace the stored log with `log`.
    fn save(&self, log: &AccessLog) -> Result<(), StoreError>;

    /// Load, apply `mutate`, and save, as a single critical section.
    ///
    /// Returns the log as it was saved.
    fn update(&self, mutate: &mut dyn FnMut(&mut AccessLog)) -> Result<AccessLog, StoreError>;
}

/// Create the configured storage backend.
pub fn open_store(config: &StorageConfig) -> Arc<dyn AccessLogStore> {
    tracing::info!(path = %config.path.display(), "Using file-backed access log");
    Arc::new(FileStore::new(&config.path))
}

/// In-memory storage, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    log: Mutex<AccessLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing log.
    pub fn with_log(log: AccessLog) -> Self {
        Self {
            log: Mutex::new(log),
        }
    }
}

impl AccessLogStore for MemoryStore {
    fn load(&self) -> AccessLog {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn save(&self, log: &AccessLog) -> Result<(), StoreError> {
        let mut guard = self.log.lock().unwrap_or_else(|e| e.into_inner());
        *guard = log.clone();
        Ok(())
    }

    fn update(&self, mutate: &mut dyn FnMut(&mut AccessLog)) -> Result<AccessLog, StoreError> {
        let mut guard = self.log.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = guard.clone();
        mutate(&mut next);
        *guard = next.clone();
        Ok(next)
    }
}

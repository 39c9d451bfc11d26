//! JSON file storage.
//!
//! The access log lives in a single pretty-printed JSON document. Every save
//! rewrites the whole document: it is written to a temporary file in the same
//! directory and renamed over the existing file, so readers only ever see a
//! complete document.
//!
//! Concurrent access is serialized with an advisory lock on a sidecar file
//! (`<document>.lock`). Readers take it shared, writers take it exclusive for
//! the full load-modify-save cycle. The lock is per open file, so it also
//! excludes other threads of the same process.

use crate::error::StoreError;
use crate::storage::AccessLogStore;
use fs2::FileExt;
use locgate_core::AccessLog;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File-backed access log.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    /// Create a store for the document at `path`. Nothing is touched on disk
    /// until the first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let lock_path = lock_path_for(&path);
        Self { path, lock_path }
    }

    /// Path of the JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self, mode: LockMode) -> io::Result<LockGuard> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        match mode {
            LockMode::Shared => FileExt::lock_shared(&file)?,
            LockMode::Exclusive => FileExt::lock_exclusive(&file)?,
        }
        Ok(LockGuard { file })
    }

    /// Read and parse the document without taking the lock.
    fn read_document(&self) -> AccessLog {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return AccessLog::new(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read access log, treating it as empty"
                );
                return AccessLog::new();
            }
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return AccessLog::new();
        }

        // Malformed storage degrades to "no data known" instead of failing the request.
        match serde_json::from_slice::<AccessLog>(&raw) {
            Ok(log) => {
                if log.unreadable_count() > 0 {
                    tracing::warn!(
                        path = %self.path.display(),
                        unreadable = log.unreadable_count(),
                        "Access log has unreadable records, keeping them as-is"
                    );
                }
                log
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Access log is malformed, treating it as empty"
                );
                AccessLog::new()
            }
        }
    }

    /// Serialize and atomically replace the document without taking the lock.
    fn write_document(&self, log: &AccessLog) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(log)?;

        let dir = parent_dir(&self.path);
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(StoreError::Write)?;
        tmp.write_all(&json).map_err(StoreError::Write)?;
        tmp.as_file().sync_all().map_err(StoreError::Write)?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::Write(e.error))?;

        tracing::debug!(
            path = %self.path.display(),
            identities = log.len(),
            "Saved access log"
        );
        Ok(())
    }

    fn lock_for_write(&self) -> Result<LockGuard, StoreError> {
        ensure_parent_dir(&self.path).map_err(StoreError::Write)?;
        self.lock(LockMode::Exclusive).map_err(StoreError::Lock)
    }
}

impl AccessLogStore for FileStore {
    fn load(&self) -> AccessLog {
        if !self.path.exists() {
            return AccessLog::new();
        }

        let _guard = match self.lock(LockMode::Shared) {
            Ok(guard) => Some(guard),
            Err(e) => {
                tracing::warn!(
                    path = %self.lock_path.display(),
                    error = %e,
                    "Failed to take shared lock, reading access log unlocked"
                );
                None
            }
        };
        self.read_document()
    }

    fn save(&self, log: &AccessLog) -> Result<(), StoreError> {
        let _guard = self.lock_for_write()?;
        self.write_document(log)
    }

    fn update(&self, mutate: &mut dyn FnMut(&mut AccessLog)) -> Result<AccessLog, StoreError> {
        let _guard = self.lock_for_write()?;
        let mut log = self.read_document();
        mutate(&mut log);
        self.write_document(&log)?;
        Ok(log)
    }
}

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Holds the advisory lock until dropped.
struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "locgate".into());
    name.push(".lock");
    path.with_file_name(name)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    let parent = parent_dir(path);
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

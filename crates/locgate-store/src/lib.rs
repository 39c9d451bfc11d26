//! # locgate-store
//!
//! Persistence for the locgate access log.
//!
//! - [`FileStore`]: single JSON document on disk, rewritten atomically under
//!   an advisory file lock
//! - [`MemoryStore`]: in-process backend for tests and embedding
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use locgate_store::{AccessLogStore, FileStore};
//! use chrono::NaiveDate;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileStore::new("data/loc_access_log.json");
//! let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!
//! store.update(&mut |log| {
//!     log.record_payment("alice", today, Some("0xabc"));
//! })?;
//!
//! assert!(store.load().get("alice").is_some());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file;
pub mod storage;

pub use error::StoreError;
pub use file::FileStore;
pub use storage::{AccessLogStore, MemoryStore, open_store};

//! # locgate-core
//!
//! Shared types for the locgate access gate:
//!
//! - [`record`]: the access log document (identity -> last payment + history)
//! - [`policy`]: the 30-day access window rule
//! - [`clock`]: time source and calendar-date conversion
//! - [`config`]: TOML configuration

pub mod clock;
pub mod config;
pub mod policy;
pub mod record;

pub use clock::{Clock, FixedClock, SystemClock, local_date};
pub use config::{ConfigError, GateConfig, PolicyConfig, ServerConfig, StorageConfig, Timezone};
pub use policy::{ACCESS_WINDOW_DAYS, AccessStatus, evaluate, expires_on};
pub use record::{AccessLog, AccessRecord, DATE_FORMAT, HistoryEntry, HistoryItem, format_date, parse_date};

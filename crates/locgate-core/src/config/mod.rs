//! Configuration types for locgate.
//!
//! Configuration is a single TOML file. Every section is optional:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [storage]
//! path = "data/loc_access_log.json"
//!
//! [policy]
//! timezone = "UTC"
//! ```

pub mod policy;
pub mod server;
pub mod storage;

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use policy::{InvalidTimezone, PolicyConfig, Timezone};
pub use server::ServerConfig;
pub use storage::StorageConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LOCGATE_CONFIG";

/// Config file picked up from the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "locgate.toml";

/// Complete locgate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// HTTP transport settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Access log storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Access policy settings.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has invalid values.
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl GateConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve and load configuration.
    ///
    /// Order: `explicit`, then `$LOCGATE_CONFIG`, then `./locgate.toml` if it
    /// exists, else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path(explicit) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    if let Ok(p) = env::var(CONFIG_ENV) {
        if !p.is_empty() {
            return Some(PathBuf::from(p));
        }
    }
    let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
    fallback.exists().then_some(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.storage.path, PathBuf::from("loc_access_log.json"));
        assert_eq!(config.policy.timezone, Timezone::utc());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = GateConfig::from_toml(
            r#"
            [policy]
            timezone = "+02:00"
            "#,
        )
        .unwrap();
        assert_eq!(config.policy.offset().local_minus_utc(), 7200);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_timezone_is_rejected() {
        let err = GateConfig::from_toml("[policy]\ntimezone = \"Mars/Olympus\"\n").unwrap_err();
        assert!(err.to_string().contains("invalid timezone"));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nbind = \"127.0.0.1:9000\"\n\n[storage]\npath = \"/var/lib/locgate/log.json\""
        )
        .unwrap();

        let config = GateConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.storage.path, PathBuf::from("/var/lib/locgate/log.json"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GateConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

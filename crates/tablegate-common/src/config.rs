//! Configuration types for tablegate
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `TABLEGATE_*` environment variables (`TABLEGATE_CACHE__PATH=...`).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "TABLEGATE";

/// Root configuration for tablegate
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metadata cache configuration
    pub cache: CacheConfig,
    /// Backing store configuration
    pub storage: StorageConfig,
    /// Admission controller configuration
    pub gate: GateConfig,
}

impl Config {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Which metadata cache backend to use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local, lost on exit
    Memory,
    /// Persistent redb database file
    #[default]
    Redb,
}

/// Metadata cache configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache name (used in logs)
    pub name: String,
    /// Backend implementation
    pub backend: CacheBackend,
    /// Database file for the redb backend
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: "tablegate".to_string(),
            backend: CacheBackend::Redb,
            path: PathBuf::from("tablegate-cache.redb"),
        }
    }
}

/// Backing store configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Column store endpoint. Only reported by the bundled in-process
    /// engine; a networked engine connects here
    pub address: String,
    /// Keyspace every command runs in
    pub keyspace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:9042".to_string(),
            keyspace: "tablegate".to_string(),
        }
    }
}

/// Admission controller configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Put the settled content marker back when a write fails in storage
    /// after the marker was cleared
    pub restore_marker_on_failure: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            restore_marker_on_failure: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache.backend, CacheBackend::Redb);
        assert_eq!(config.storage.keyspace, "tablegate");
        assert!(config.gate.restore_marker_on_failure);
    }

    #[test]
    fn test_load_defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.cache.name, "tablegate");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[cache]\nbackend = \"memory\"\n\n[storage]\nkeyspace = \"shop\"\n\n[gate]\nrestore_marker_on_failure = false"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.storage.keyspace, "shop");
        assert_eq!(config.storage.address, "127.0.0.1:9042");
        assert!(!config.gate.restore_marker_on_failure);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Config::load(Some(Path::new("/nonexistent/tablegate.toml")));
        assert!(result.is_err());
    }
}

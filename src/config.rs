//! Serializable configuration for satpos.
//!
//! A [`Config`] names the store backend, the positions table, and the
//! optional snapshot file to ingest. It loads from JSON or (with the `toml`
//! feature) TOML and is passed explicitly to [`TrackerBuilder`].
//!
//! # Example
//!
//! ```rust
//! use satpos::config::{Config, StoreBackend};
//!
//! let json = r#"{
//!     "store": { "backend": { "kind": "sqlite", "path": "positions.db" } },
//!     "ingest": { "data_file": "starlink_historical_data.json" }
//! }"#;
//! let config = Config::from_json(json).unwrap();
//! assert_eq!(config.store.table_name, "satellite_positions");
//! assert!(matches!(config.store.backend, StoreBackend::Sqlite { .. }));
//! ```
//!
//! [`TrackerBuilder`]: crate::builder::TrackerBuilder

use crate::compute::validation::validate_table_name;
use crate::error::{Result, SatposError};
use crate::storage::DEFAULT_TABLE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which store implementation backs the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local table, gone on exit.
    #[default]
    Memory,
    /// In-memory table persisted to a snapshot file.
    Snapshot { path: PathBuf },
    /// SQLite database file.
    Sqlite { path: PathBuf },
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Snapshot { .. } => "snapshot",
            StoreBackend::Sqlite { .. } => "sqlite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Name of the positions table (plain SQL identifier).
    #[serde(default = "StoreConfig::default_table_name")]
    pub table_name: String,
}

impl StoreConfig {
    fn default_table_name() -> String {
        DEFAULT_TABLE_NAME.to_string()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            table_name: Self::default_table_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Starlink JSON snapshot loaded when the table is empty.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Config {
    pub fn with_backend(mut self, backend: StoreBackend) -> Self {
        self.store.backend = backend;
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.store.table_name = table_name.into();
        self
    }

    pub fn with_data_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.ingest.data_file = Some(path.into());
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        validate_table_name(&self.store.table_name)?;

        match &self.store.backend {
            StoreBackend::Memory => {}
            StoreBackend::Snapshot { path } => {
                if !cfg!(feature = "snapshot") {
                    return Err(SatposError::Config(
                        "snapshot backend requires the 'snapshot' feature".to_string(),
                    ));
                }
                if path.as_os_str().is_empty() {
                    return Err(SatposError::Config("snapshot path is empty".to_string()));
                }
            }
            StoreBackend::Sqlite { path } => {
                if !cfg!(feature = "sqlite") {
                    return Err(SatposError::Config(
                        "sqlite backend requires the 'sqlite' feature".to_string(),
                    ));
                }
                if path.as_os_str().is_empty() {
                    return Err(SatposError::Config("sqlite path is empty".to_string()));
                }
            }
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| SatposError::Config(format!("invalid JSON config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)
            .map_err(|e| SatposError::Config(format!("invalid TOML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SatposError::Config(format!("cannot encode TOML config: {}", e)))
    }

    /// Read a config file, choosing the format by extension (`.toml` or `.json`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            #[cfg(feature = "toml")]
            Some("toml") => Self::from_toml(&text),
            other => Err(SatposError::Config(format!(
                "unsupported config format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.table_name, "satellite_positions");
        assert!(config.ingest.data_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = Config::default()
            .with_backend(StoreBackend::Snapshot {
                path: PathBuf::from("positions.snap"),
            })
            .with_table_name("positions_2020")
            .with_data_file("starlink.json");

        let json = config.to_json().unwrap();
        assert!(json.contains("\"kind\": \"snapshot\""));
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = Config::from_json(r#"{"store": {"tabel_name": "x"}}"#).unwrap_err();
        assert!(matches!(err, SatposError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_table_name() {
        let err = Config::from_json(r#"{"store": {"table_name": "positions; DROP TABLE x"}}"#)
            .unwrap_err();
        assert!(matches!(err, SatposError::Config(_)));
    }

    #[test]
    fn test_rejects_empty_path() {
        let config = Config::default().with_backend(StoreBackend::Sqlite {
            path: PathBuf::new(),
        });
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_roundtrip() {
        let toml_str = r#"
            [store]
            table_name = "satellite_positions"

            [store.backend]
            kind = "sqlite"
            path = "positions.db"

            [ingest]
            data_file = "starlink_historical_data.json"
        "#;

        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(
            config.store.backend,
            StoreBackend::Sqlite {
                path: PathBuf::from("positions.db")
            }
        );
        assert_eq!(
            config.ingest.data_file,
            Some(PathBuf::from("starlink_historical_data.json"))
        );

        let encoded = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&encoded).unwrap(), config);
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = tempfile::TempDir::new().unwrap();

        let json_path = dir.path().join("satpos.json");
        std::fs::write(&json_path, r#"{"store": {"table_name": "positions"}}"#).unwrap();
        assert_eq!(
            Config::load(&json_path).unwrap().store.table_name,
            "positions"
        );

        let other = dir.path().join("satpos.yaml");
        std::fs::write(&other, "store: {}").unwrap();
        assert!(matches!(
            Config::load(&other),
            Err(SatposError::Config(_))
        ));
    }
}

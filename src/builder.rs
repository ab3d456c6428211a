//! Tracker builder for flexible configuration
//!
//! Opens the store a [`Config`] describes and, when a data file is
//! configured, provisions and populates it before handing out the tracker.

use crate::config::{Config, StoreBackend, StoreConfig};
use crate::error::{Result, SatposError};
use crate::ingest::read_snapshot;
use crate::storage::{AnyStore, LoadOutcome, MemoryStore, provision};
#[cfg(feature = "sqlite")]
use crate::storage::SqliteStore;
use crate::tracker::SatelliteTracker;
use std::path::PathBuf;
use std::sync::Arc;

/// Open the store described by `config` without provisioning it.
///
/// The memory backend starts with an empty table; the others are opened as
/// found on disk.
pub fn open_store(config: &StoreConfig) -> Result<AnyStore> {
    match &config.backend {
        StoreBackend::Memory => Ok(MemoryStore::new().into()),

        #[cfg(feature = "snapshot")]
        StoreBackend::Snapshot { path } => Ok(MemoryStore::open_snapshot(path)?.into()),
        #[cfg(not(feature = "snapshot"))]
        StoreBackend::Snapshot { .. } => Err(SatposError::Config(
            "snapshot backend requires the 'snapshot' feature".to_string(),
        )),

        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite { path } => Ok(SqliteStore::open(path, &config.table_name)?.into()),
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite { .. } => Err(SatposError::Config(
            "sqlite backend requires the 'sqlite' feature".to_string(),
        )),
    }
}

/// Builder for a [`SatelliteTracker`] over a configured store.
#[derive(Debug, Default)]
pub struct TrackerBuilder {
    config: Config,
}

impl TrackerBuilder {
    /// Create a new builder with default in-memory configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.config.store.backend = StoreBackend::Memory;
        self
    }

    /// Keep the table in memory, persisted to a snapshot file at `path`.
    pub fn snapshot<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.store.backend = StoreBackend::Snapshot { path: path.into() };
        self
    }

    /// Store positions in the SQLite database at `path`.
    pub fn sqlite<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.store.backend = StoreBackend::Sqlite { path: path.into() };
        self
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.config.store.table_name = table_name.into();
        self
    }

    /// Ingest this Starlink snapshot when the table is empty.
    pub fn data_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.ingest.data_file = Some(path.into());
        self
    }

    /// Open the store and build the tracker.
    ///
    /// With a data file configured, the table is created if missing and
    /// loaded unless it already holds records. Without one, the store is
    /// used as found; an in-memory store gets an empty table.
    pub fn build(self) -> Result<SatelliteTracker> {
        self.config.validate()?;
        let store = open_store(&self.config.store)?;

        if let Some(data_file) = &self.config.ingest.data_file {
            let records = read_snapshot(data_file)?;
            if let LoadOutcome::Loaded(n) = provision(&store, records)? {
                log::debug!(
                    "{} backend populated with {} records",
                    self.config.store.backend.name(),
                    n
                );
            }
        }

        Ok(SatelliteTracker::new(Arc::new(store)))
    }

    /// The configuration this builder would build from.
    pub fn current_config(&self) -> &Config {
        &self.config
    }
}

impl TryFrom<Config> for SatelliteTracker {
    type Error = SatposError;

    fn try_from(config: Config) -> Result<Self> {
        TrackerBuilder::new().config(config).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::PositionStore;
    use std::io::Write;
    use tempfile::NamedTempFile;
    #[cfg(any(feature = "snapshot", feature = "sqlite"))]
    use tempfile::TempDir;

    fn data_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                {"spaceTrack": {"CREATION_DATE": "2020-05-19T06:26:10"},
                 "id": "60106f20e900d60006e32cc3",
                 "latitude": 5.423581610589942, "longitude": 2.0},
                {"spaceTrack": {"CREATION_DATE": "2020-05-19T06:26:10"},
                 "id": "5eed7714096e59000698580c",
                 "latitude": null, "longitude": null}
            ]"#,
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_builder_default() {
        let builder = TrackerBuilder::new();
        assert_eq!(builder.current_config().store.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_builder_in_memory_is_empty() {
        let tracker = TrackerBuilder::new().in_memory().build().unwrap();
        assert_eq!(tracker.count().unwrap(), 0);
        assert!(tracker.closest_satellite(0.0, 0.0, None).unwrap().is_none());
    }

    #[test]
    fn test_builder_loads_data_file() {
        let data = data_file();
        let tracker = TrackerBuilder::new().data_file(data.path()).build().unwrap();
        assert_eq!(tracker.count().unwrap(), 2);
    }

    #[test]
    fn test_builder_rejects_bad_table_name() {
        let err = TrackerBuilder::new()
            .table_name("1positions")
            .build()
            .unwrap_err();
        assert!(matches!(err, SatposError::Config(_)));
    }

    #[cfg(feature = "snapshot")]
    #[test]
    fn test_builder_snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("positions.snap");
        let data = data_file();

        let first = TrackerBuilder::new()
            .snapshot(&path)
            .data_file(data.path())
            .build()
            .unwrap();
        assert_eq!(first.count().unwrap(), 2);
        drop(first);

        let second = TrackerBuilder::new().snapshot(&path).build().unwrap();
        assert_eq!(second.store().count().unwrap(), 2);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_builder_sqlite_without_setup_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let tracker = TrackerBuilder::new()
            .sqlite(dir.path().join("positions.db"))
            .build()
            .unwrap();
        assert!(tracker.count().unwrap_err().is_store_unavailable());
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_try_from_config() {
        let dir = TempDir::new().unwrap();
        let data = data_file();
        let config = Config::default()
            .with_backend(StoreBackend::Sqlite {
                path: dir.path().join("positions.db"),
            })
            .with_data_file(data.path());

        let tracker = SatelliteTracker::try_from(config).unwrap();
        assert_eq!(tracker.count().unwrap(), 2);
    }
}

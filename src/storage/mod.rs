//! Position storage abstraction for satpos.
//!
//! [`PositionStore`] is the read side the query engine depends on: a record
//! count and a time-bounded scan. [`TableAdmin`] adds the provisioning and
//! bulk-load operations used by the loader and the CLI.

use crate::error::{Result, SatposError};
use satpos_types::{PositionRecord, Timestamp};
use tokio_util::sync::CancellationToken;

mod memory;
#[cfg(feature = "snapshot")]
pub mod snapshot;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "snapshot")]
pub use snapshot::SnapshotFile;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Default name of the positions table.
pub const DEFAULT_TABLE_NAME: &str = "satellite_positions";

/// Number of rows a backend reads between cancellation checks.
pub(crate) const CANCEL_CHECK_INTERVAL: usize = 1024;

/// Parameters of a time-bounded scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanRequest<'a> {
    /// Restrict the scan to one satellite; `None` scans the whole fleet.
    pub entity_id: Option<&'a str>,
    /// Inclusive upper bound on record time.
    pub at_or_before: Timestamp,
    pub cancel: Option<&'a CancellationToken>,
}

impl<'a> ScanRequest<'a> {
    pub fn all(at_or_before: Timestamp) -> Self {
        Self {
            entity_id: None,
            at_or_before,
            cancel: None,
        }
    }

    pub fn entity(entity_id: &'a str, at_or_before: Timestamp) -> Self {
        Self {
            entity_id: Some(entity_id),
            at_or_before,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fails with [`SatposError::Cancelled`] once the token fired.
    pub fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(SatposError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Read access to stored positions.
///
/// Implementations must be safe to query from many threads at once.
pub trait PositionStore: Send + Sync {
    /// Total number of stored records.
    fn count(&self) -> Result<u64>;

    /// All records matching `request` with `time <= request.at_or_before`.
    ///
    /// No ordering is guaranteed. Backends poll `request.cancel` while
    /// reading and return [`SatposError::Cancelled`] when it fires.
    fn scan(&self, request: &ScanRequest<'_>) -> Result<Vec<PositionRecord>>;
}

/// Provisioning and bulk loading of the positions table.
pub trait TableAdmin: PositionStore {
    /// Create the table and its indexes. Returns `false` if it already exists.
    fn setup(&self) -> Result<bool>;

    /// Drop the table and every record. Returns `false` if it did not exist.
    fn teardown(&self) -> Result<bool>;

    /// Insert `records` if, and only if, the table is empty.
    ///
    /// The emptiness check and the insert are atomic with respect to other
    /// loads on the same store.
    fn load(&self, records: Vec<PositionRecord>) -> Result<LoadOutcome>;
}

/// Result of a bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// The table already held data; nothing was written.
    Skipped { existing: u64 },
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }
}

/// Create the table if needed, then load `records` unless data is present.
pub fn provision<S: TableAdmin + ?Sized>(
    store: &S,
    records: Vec<PositionRecord>,
) -> Result<LoadOutcome> {
    if store.setup()? {
        log::info!("created positions table");
    }

    let outcome = store.load(records)?;
    match outcome {
        LoadOutcome::Loaded(n) => log::info!("loaded {} position records", n),
        LoadOutcome::Skipped { existing } => {
            log::warn!("positions table already holds {} records, load skipped", existing)
        }
    }
    Ok(outcome)
}

/// Store selected at runtime from configuration.
pub enum AnyStore {
    Memory(MemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStore),
}

impl PositionStore for AnyStore {
    fn count(&self) -> Result<u64> {
        match self {
            AnyStore::Memory(store) => store.count(),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(store) => store.count(),
        }
    }

    fn scan(&self, request: &ScanRequest<'_>) -> Result<Vec<PositionRecord>> {
        match self {
            AnyStore::Memory(store) => store.scan(request),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(store) => store.scan(request),
        }
    }
}

impl TableAdmin for AnyStore {
    fn setup(&self) -> Result<bool> {
        match self {
            AnyStore::Memory(store) => store.setup(),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(store) => store.setup(),
        }
    }

    fn teardown(&self) -> Result<bool> {
        match self {
            AnyStore::Memory(store) => store.teardown(),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(store) => store.teardown(),
        }
    }

    fn load(&self, records: Vec<PositionRecord>) -> Result<LoadOutcome> {
        match self {
            AnyStore::Memory(store) => store.load(records),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(store) => store.load(records),
        }
    }
}

impl From<MemoryStore> for AnyStore {
    fn from(store: MemoryStore) -> Self {
        AnyStore::Memory(store)
    }
}

#[cfg(feature = "sqlite")]
impl From<SqliteStore> for AnyStore {
    fn from(store: SqliteStore) -> Self {
        AnyStore::Sqlite(store)
    }
}

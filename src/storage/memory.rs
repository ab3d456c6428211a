//! In-memory position store with time and per-satellite indexes.
//!
//! Records live in one vector; two B-tree indexes map timestamps to vector
//! slots, one across the fleet and one per satellite, so both scan shapes
//! are range reads bounded by the cutoff. With a snapshot file attached the
//! table survives restarts.

use super::{CANCEL_CHECK_INTERVAL, LoadOutcome, PositionStore, ScanRequest, TableAdmin};
use crate::error::{Result, SatposError};
#[cfg(feature = "snapshot")]
use crate::storage::SnapshotFile;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use satpos_types::{PositionRecord, Timestamp};
use std::collections::BTreeMap;
#[cfg(feature = "snapshot")]
use std::path::Path;

type TimeIndex = BTreeMap<Timestamp, Vec<usize>>;

#[derive(Default)]
struct PositionTable {
    records: Vec<PositionRecord>,
    by_time: TimeIndex,
    by_entity: FxHashMap<String, TimeIndex>,
}

impl PositionTable {
    fn from_records(records: Vec<PositionRecord>) -> Self {
        let mut table = Self::default();
        table.records.reserve(records.len());
        for record in records {
            table.insert(record);
        }
        table
    }

    fn insert(&mut self, record: PositionRecord) {
        let slot = self.records.len();
        self.by_time.entry(record.time).or_default().push(slot);
        self.by_entity
            .entry(record.entity_id.clone())
            .or_default()
            .entry(record.time)
            .or_default()
            .push(slot);
        self.records.push(record);
    }

    fn scan(&self, request: &ScanRequest<'_>) -> Result<Vec<PositionRecord>> {
        request.check_cancelled()?;

        let index = match request.entity_id {
            Some(entity_id) => match self.by_entity.get(entity_id) {
                Some(index) => index,
                None => return Ok(Vec::new()),
            },
            None => &self.by_time,
        };

        let mut out = Vec::new();
        let slots = index
            .range(..=request.at_or_before)
            .flat_map(|(_, slots)| slots.iter().copied());

        for (n, slot) in slots.enumerate() {
            if n % CANCEL_CHECK_INTERVAL == 0 {
                request.check_cancelled()?;
            }
            out.push(self.records[slot].clone());
        }

        Ok(out)
    }
}

/// Time-indexed in-memory store, optionally backed by a snapshot file.
pub struct MemoryStore {
    table: RwLock<Option<PositionTable>>,
    #[cfg(feature = "snapshot")]
    snapshot: Option<SnapshotFile>,
}

impl MemoryStore {
    /// A store with an empty, provisioned table.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Some(PositionTable::default())),
            #[cfg(feature = "snapshot")]
            snapshot: None,
        }
    }

    /// A store whose table has not been created yet.
    pub fn unprovisioned() -> Self {
        Self {
            table: RwLock::new(None),
            #[cfg(feature = "snapshot")]
            snapshot: None,
        }
    }

    /// Open a snapshot-backed store.
    ///
    /// An existing snapshot is read into memory; without one the table does
    /// not exist until [`TableAdmin::setup`] is called.
    #[cfg(feature = "snapshot")]
    pub fn open_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
        let snapshot = SnapshotFile::new(path);
        let table = if snapshot.exists() {
            let records = snapshot.load()?;
            log::info!(
                "restored {} records from {}",
                records.len(),
                snapshot.path().display()
            );
            Some(PositionTable::from_records(records))
        } else {
            None
        };

        Ok(Self {
            table: RwLock::new(table),
            snapshot: Some(snapshot),
        })
    }

    fn persist(&self, _records: &[PositionRecord]) -> Result<()> {
        #[cfg(feature = "snapshot")]
        if let Some(snapshot) = &self.snapshot {
            snapshot.save(_records)?;
        }
        Ok(())
    }

    fn missing_table() -> SatposError {
        SatposError::StoreUnavailable("positions table does not exist".to_string())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionStore for MemoryStore {
    fn count(&self) -> Result<u64> {
        let table = self.table.read();
        let table = table.as_ref().ok_or_else(Self::missing_table)?;
        Ok(table.records.len() as u64)
    }

    fn scan(&self, request: &ScanRequest<'_>) -> Result<Vec<PositionRecord>> {
        let table = self.table.read();
        let table = table.as_ref().ok_or_else(Self::missing_table)?;
        table.scan(request)
    }
}

impl TableAdmin for MemoryStore {
    fn setup(&self) -> Result<bool> {
        let mut table = self.table.write();
        if table.is_some() {
            return Ok(false);
        }
        self.persist(&[])?;
        *table = Some(PositionTable::default());
        Ok(true)
    }

    fn teardown(&self) -> Result<bool> {
        let mut table = self.table.write();

        // The snapshot goes first: a failed removal leaves the table intact.
        #[cfg(feature = "snapshot")]
        let removed_file = match &self.snapshot {
            Some(snapshot) => snapshot.remove()?,
            None => false,
        };
        #[cfg(not(feature = "snapshot"))]
        let removed_file = false;

        let existed = table.take().is_some();
        Ok(existed || removed_file)
    }

    fn load(&self, records: Vec<PositionRecord>) -> Result<LoadOutcome> {
        let mut table = self.table.write();
        let existing = table.as_ref().ok_or_else(Self::missing_table)?.records.len();
        if existing > 0 {
            return Ok(LoadOutcome::Skipped {
                existing: existing as u64,
            });
        }

        self.persist(&records)?;
        let loaded = records.len();
        *table = Some(PositionTable::from_records(records));
        Ok(LoadOutcome::Loaded(loaded))
    }
}

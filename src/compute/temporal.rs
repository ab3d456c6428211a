//! Point-in-time queries over a position store.
//!
//! Both queries answer "what was the last known record as of the cutoff".
//! The per-entity variant is a single grouped aggregation over one time-range
//! scan: the whole fleet is read once and folded into one winner per entity,
//! never one store round trip per satellite.
//!
//! ## Tie-breaks
//!
//! Timestamps are not unique within an entity's history. When several
//! records share the maximal time, the one whose `(latitude, longitude)` is
//! smallest in total order wins, with missing coordinates ordered after any
//! value. The choice depends only on record contents, so every backend and
//! every scan order produce the same answer.

use crate::error::Result;
use crate::storage::{PositionStore, ScanRequest};
use log::debug;
use rustc_hash::FxHashMap;
use satpos_types::{PositionRecord, Timestamp};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use tokio_util::sync::CancellationToken;

/// Read-only query engine borrowing a store for the duration of a query.
pub struct TemporalEngine<'s, S: PositionStore + ?Sized> {
    store: &'s S,
    cancel: Option<&'s CancellationToken>,
}

impl<'s, S: PositionStore + ?Sized> TemporalEngine<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            cancel: None,
        }
    }

    /// Abort store scans once `token` is cancelled.
    pub fn with_cancellation(mut self, token: &'s CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn request<'r>(&'r self, entity_id: Option<&'r str>, cutoff: Timestamp) -> ScanRequest<'r> {
        ScanRequest {
            entity_id,
            at_or_before: cutoff,
            cancel: self.cancel,
        }
    }

    /// Latest record of `entity_id` with `time <= cutoff`.
    ///
    /// Records without coordinates are eligible. Ids are matched exactly,
    /// blank ones included. Returns `None` when the satellite has no record
    /// at or before the cutoff.
    pub fn last_position_for(
        &self,
        entity_id: &str,
        cutoff: Timestamp,
    ) -> Result<Option<PositionRecord>> {
        let records = self.store.scan(&self.request(Some(entity_id), cutoff))?;
        let scanned = records.len();

        let latest = records
            .into_iter()
            .filter(|r| r.entity_id == entity_id && r.time <= cutoff)
            .reduce(|current, candidate| {
                if supersedes(&candidate, &current) {
                    candidate
                } else {
                    current
                }
            });

        debug!(
            "last_position_for {} at {}: scanned {} records, found={}",
            entity_id,
            cutoff,
            scanned,
            latest.is_some()
        );

        Ok(latest)
    }

    /// Latest positioned record of every satellite with `time <= cutoff`.
    ///
    /// Records without coordinates are dropped before grouping, so a
    /// satellite whose newest record lacks a position contributes its newest
    /// positioned one instead, and a satellite with no positioned record at
    /// all is absent. Sorted by time descending, then by satellite id.
    pub fn last_position_per_entity(&self, cutoff: Timestamp) -> Result<Vec<PositionRecord>> {
        let records = self.store.scan(&self.request(None, cutoff))?;
        let scanned = records.len();

        let mut latest: FxHashMap<String, PositionRecord> = FxHashMap::default();
        for record in records {
            if record.time > cutoff || !record.has_position() {
                continue;
            }
            match latest.entry(record.entity_id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(mut slot) => {
                    if supersedes(&record, slot.get()) {
                        slot.insert(record);
                    }
                }
            }
        }

        let mut result: Vec<PositionRecord> = latest.into_values().collect();
        result.sort_by(|a, b| {
            b.time
                .cmp(&a.time)
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });

        debug!(
            "last_position_per_entity at {}: scanned {} records, {} satellites",
            cutoff,
            scanned,
            result.len()
        );

        Ok(result)
    }
}

/// Whether `candidate` replaces `current` as the latest record of an entity.
fn supersedes(candidate: &PositionRecord, current: &PositionRecord) -> bool {
    match candidate.time.cmp(&current.time) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => coordinate_order(candidate, current) == Ordering::Less,
    }
}

fn coordinate_order(a: &PositionRecord, b: &PositionRecord) -> Ordering {
    compare_coordinate(a.latitude, b.latitude)
        .then_with(|| compare_coordinate(a.longitude, b.longitude))
}

fn compare_coordinate(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

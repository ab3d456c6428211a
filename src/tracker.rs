//! Query facade combining the temporal engine with distance evaluation.

use crate::compute::distance::nearest;
use crate::compute::temporal::TemporalEngine;
use crate::compute::validation::validate_reference_point;
use crate::error::Result;
use crate::storage::{AnyStore, PositionStore};
use crate::time::cutoff_or_now;
use satpos_types::{PositionRecord, Timestamp};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Winner of a closest-satellite query.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosestSatellite {
    pub record: PositionRecord,
    /// Great-circle distance from the reference point, in kilometers.
    pub distance_km: f64,
}

/// Answers point-in-time position queries against a shared store.
///
/// Cheap to clone; clones share the store. Every query is read-only, so a
/// tracker can be used from many threads at once.
///
/// # Examples
///
/// ```rust
/// use satpos::prelude::*;
/// use satpos::time::parse_timestamp;
/// use std::sync::Arc;
///
/// # fn main() -> satpos::Result<()> {
/// let store = MemoryStore::new();
/// store.load(vec![PositionRecord::new(
///     parse_timestamp("2020-05-19T06:26:10")?,
///     "60106f20e900d60006e32cc3",
///     Some(5.423581610589942),
///     Some(2.0),
/// )])?;
///
/// let tracker = SatelliteTracker::new(Arc::new(store));
/// let cutoff = parse_timestamp("2020-05-19T06:27:10")?;
/// let closest = tracker
///     .closest_satellite(-40.4098530291677, 108.0, Some(cutoff))?
///     .expect("one candidate");
/// assert_eq!(closest.distance_km.trunc(), 11750.0);
/// # Ok(())
/// # }
/// ```
pub struct SatelliteTracker<S: PositionStore + ?Sized = AnyStore> {
    store: Arc<S>,
    cancel: Option<CancellationToken>,
}

impl<S: PositionStore + ?Sized> Clone for SatelliteTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cancel: self.cancel.clone(),
        }
    }
}

impl<S: PositionStore + ?Sized> fmt::Debug for SatelliteTracker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SatelliteTracker")
            .field("cancellable", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: PositionStore + ?Sized> SatelliteTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cancel: None,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// A tracker sharing this store whose queries abort once `token` fires.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cancel: Some(token),
        }
    }

    fn engine(&self) -> TemporalEngine<'_, S> {
        let engine = TemporalEngine::new(self.store.as_ref());
        match &self.cancel {
            Some(token) => engine.with_cancellation(token),
            None => engine,
        }
    }

    /// Total number of stored records.
    pub fn count(&self) -> Result<u64> {
        self.store.count()
    }

    /// Most recent record of `satellite_id` at or before `cutoff`
    /// (default: now). `None` means no such record exists.
    pub fn last_position(
        &self,
        satellite_id: &str,
        cutoff: Option<Timestamp>,
    ) -> Result<Option<PositionRecord>> {
        self.engine()
            .last_position_for(satellite_id, cutoff_or_now(cutoff))
    }

    /// Most recent positioned record of every satellite at or before
    /// `cutoff` (default: now), newest first.
    pub fn last_positions(&self, cutoff: Option<Timestamp>) -> Result<Vec<PositionRecord>> {
        self.engine().last_position_per_entity(cutoff_or_now(cutoff))
    }

    /// Satellite whose last known position at `cutoff` (default: now) is
    /// closest to `(latitude, longitude)`.
    ///
    /// Coordinates are validated before the store is read. Returns `None`
    /// when no satellite has a known position at the cutoff. Equally
    /// distant satellites resolve to the smallest satellite id.
    pub fn closest_satellite(
        &self,
        latitude: f64,
        longitude: f64,
        cutoff: Option<Timestamp>,
    ) -> Result<Option<ClosestSatellite>> {
        let reference = validate_reference_point(latitude, longitude)?;
        let cutoff = cutoff_or_now(cutoff);

        let candidates = self.engine().last_position_per_entity(cutoff)?;
        let candidate_count = candidates.len();

        let closest = nearest(&reference, candidates)
            .map(|(record, distance_km)| ClosestSatellite {
                record,
                distance_km,
            });

        match &closest {
            Some(found) => log::debug!(
                "closest to {} at {}: {} at {:.3} km ({} candidates)",
                reference,
                cutoff,
                found.record.entity_id,
                found.distance_km,
                candidate_count
            ),
            None => log::debug!("closest to {} at {}: no candidates", reference, cutoff),
        }

        Ok(closest)
    }
}

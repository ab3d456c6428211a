//! Point-in-time satellite position store with a temporal nearest-neighbor
//! query engine.
//!
//! Position history is loaded once from a Starlink snapshot. Queries then
//! answer "where was satellite S at time T" and "which satellite was closest
//! to (lat, lon) at time T", both against the last known record of each
//! satellite at or before the cutoff.
//!
//! ```rust
//! use satpos::prelude::*;
//! use satpos::time::parse_timestamp;
//!
//! let tracker = TrackerBuilder::new().in_memory().build()?;
//! tracker.store().load(vec![
//!     PositionRecord::new(
//!         parse_timestamp("2021-01-21T06:26:10")?,
//!         "5f487be7d76203000692e59f",
//!         Some(-40.4098530291677),
//!         Some(108.0),
//!     ),
//!     PositionRecord::new(
//!         parse_timestamp("2021-01-26T14:16:09")?,
//!         "5f487be7d76203000692e59f",
//!         Some(-34.47530939181558),
//!         Some(161.0),
//!     ),
//! ])?;
//!
//! let cutoff = parse_timestamp("2021-01-26T05:00:00")?;
//! let record = tracker
//!     .last_position("5f487be7d76203000692e59f", Some(cutoff))?
//!     .expect("recorded before the cutoff");
//! assert_eq!(record.longitude, Some(108.0));
//! # Ok::<(), satpos::SatposError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod ingest;
pub mod storage;
pub mod time;
pub mod tracker;

pub use builder::TrackerBuilder;
pub use config::{Config, IngestConfig, StoreBackend, StoreConfig};
pub use error::{Result, SatposError};
pub use tracker::{ClosestSatellite, SatelliteTracker};

pub use satpos_types::{GeoPoint, PositionRecord, Timestamp};

pub use compute::distance::distance_km;

pub use storage::{
    AnyStore, DEFAULT_TABLE_NAME, LoadOutcome, MemoryStore, PositionStore, ScanRequest,
    TableAdmin, provision,
};

#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;

#[cfg(feature = "snapshot")]
pub use storage::SnapshotFile;

pub use tokio_util::sync::CancellationToken;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{
        ClosestSatellite, Result, SatelliteTracker, SatposError, TrackerBuilder,
    };

    pub use crate::{GeoPoint, PositionRecord, Timestamp};

    pub use crate::{Config, StoreBackend};

    pub use crate::{MemoryStore, PositionStore, TableAdmin};

    #[cfg(feature = "sqlite")]
    pub use crate::SqliteStore;

    pub use crate::CancellationToken;
}

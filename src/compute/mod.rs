//! Compute layer for query processing.
//!
//! Query logic lives here, separate from storage:
//! - [`temporal`]: last-known-position reduction under a cutoff
//! - [`distance`]: great-circle distance and nearest-candidate selection
//! - [`validation`]: caller input checks run before any store access
//!
//! Nothing in this module holds state; every function works on what a
//! [`PositionStore`](crate::storage::PositionStore) scan returns.

pub mod distance;
pub mod temporal;
pub mod validation;

pub use distance::{distance_km, nearest};
pub use temporal::TemporalEngine;

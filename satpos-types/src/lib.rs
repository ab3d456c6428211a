//! # satpos-types
//!
//! Core data types shared by the satpos store, query engine and CLI.
//!
//! - **`PositionRecord`**: one timestamped observation of a satellite, with
//!   optional coordinates
//! - **`GeoPoint`**: a latitude/longitude pair backed by `geo::Point`
//!
//! ## Examples
//!
//! ```rust
//! use satpos_types::{GeoPoint, PositionRecord};
//! use chrono::NaiveDate;
//!
//! let time = NaiveDate::from_ymd_opt(2021, 1, 21)
//!     .unwrap()
//!     .and_hms_opt(6, 26, 10)
//!     .unwrap();
//! let record = PositionRecord::new(time, "5f487be7d76203000692e59f", Some(-40.4), Some(108.0));
//!
//! let point = record.position().unwrap();
//! assert_eq!(point, GeoPoint::new(-40.4, 108.0));
//! ```

pub mod geo;
pub mod record;

pub use crate::geo::GeoPoint;
pub use crate::record::PositionRecord;

/// Timestamp type used throughout satpos: naive, UTC implied.
pub type Timestamp = chrono::NaiveDateTime;

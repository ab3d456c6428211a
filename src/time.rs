//! Timestamp parsing and the default cutoff.

use crate::error::{Result, SatposError};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use satpos_types::Timestamp;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp without offset.
///
/// Accepts `T` or a space as the date/time separator, optional fractional
/// seconds, minute precision, and a bare date (midnight).
///
/// ```
/// use satpos::time::parse_timestamp;
///
/// let t = parse_timestamp("2021-01-26T05:00:00").unwrap();
/// assert_eq!(t.to_string(), "2021-01-26 05:00:00");
/// assert!(parse_timestamp("2021-01-26T05:00:00+02:00").is_err());
/// ```
pub fn parse_timestamp(input: &str) -> Result<Timestamp> {
    let trimmed = input.trim();

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        && let Some(ts) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(ts);
    }

    Err(SatposError::InvalidTimestamp {
        input: input.to_string(),
    })
}

/// Current wall-clock time as a naive UTC timestamp.
pub fn now() -> Timestamp {
    Utc::now().naive_utc()
}

/// Resolve an optional caller cutoff, defaulting to [`now`] at call time.
pub fn cutoff_or_now(cutoff: Option<Timestamp>) -> Timestamp {
    cutoff.unwrap_or_else(now)
}

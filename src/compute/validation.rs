//! Validation for caller-supplied coordinates and table identifiers.

use crate::error::{Result, SatposError};
use satpos_types::GeoPoint;

/// Validates a latitude/longitude pair and builds the reference point.
///
/// Latitude: [-90.0, 90.0], Longitude: [-180.0, 180.0]
///
/// # Examples
///
/// ```
/// use satpos::compute::validation::validate_reference_point;
///
/// assert!(validate_reference_point(-40.4098530291677, 108.0).is_ok());
/// assert!(validate_reference_point(95.0, 0.0).is_err());
/// assert!(validate_reference_point(0.0, 181.0).is_err());
/// ```
pub fn validate_reference_point(latitude: f64, longitude: f64) -> Result<GeoPoint> {
    if !latitude.is_finite() {
        return Err(SatposError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            latitude
        )));
    }

    if !longitude.is_finite() {
        return Err(SatposError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            longitude
        )));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(SatposError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(SatposError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            longitude
        )));
    }

    Ok(GeoPoint::new(latitude, longitude))
}

/// Table names are spliced into SQL text, so only plain identifiers pass.
///
/// ```
/// use satpos::compute::validation::validate_table_name;
///
/// assert!(validate_table_name("satellite_positions").is_ok());
/// assert!(validate_table_name("positions; DROP TABLE x").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > 63 {
        return Err(SatposError::Config(format!(
            "Table name must be a plain identifier ([A-Za-z_][A-Za-z0-9_]*, max 63 chars): '{}'",
            name
        )));
    }
    Ok(())
}

//! Great-circle distance and nearest-candidate selection.

use satpos_types::{GeoPoint, PositionRecord};
use std::cmp::Ordering;

/// Haversine distance between two points in kilometers.
///
/// Spherical Earth with the mean radius used by `geo::Haversine`
/// (6371.0088 km). Symmetric and non-negative.
///
/// ```
/// use satpos::compute::distance::distance_km;
/// use satpos::GeoPoint;
///
/// let a = GeoPoint::new(-40.4098530291677, 108.0);
/// let b = GeoPoint::new(5.423581610589942, 2.0);
/// assert_eq!(distance_km(&a, &b).trunc(), 11750.0);
/// assert_eq!(distance_km(&a, &a), 0.0);
/// ```
#[inline]
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    a.haversine_distance(b) / 1000.0
}

/// Pick the candidate closest to `reference`, returning it with its
/// distance in kilometers.
///
/// Candidates without coordinates or with a non-finite distance are skipped.
/// Among equally distant candidates the smallest `entity_id` wins, so the
/// result does not depend on the order candidates arrive in.
pub fn nearest<I>(reference: &GeoPoint, candidates: I) -> Option<(PositionRecord, f64)>
where
    I: IntoIterator<Item = PositionRecord>,
{
    let mut best: Option<(PositionRecord, f64)> = None;

    for candidate in candidates {
        let Some(position) = candidate.position() else {
            continue;
        };
        let distance = distance_km(reference, &position);
        if !distance.is_finite() {
            continue;
        }

        let replace = match &best {
            None => true,
            Some((current, current_distance)) => match distance.total_cmp(current_distance) {
                Ordering::Less => true,
                Ordering::Equal => candidate.entity_id < current.entity_id,
                Ordering::Greater => false,
            },
        };

        if replace {
            best = Some((candidate, distance));
        }
    }

    best
}

//! Geographic point wrapping the `geo` crate primitive.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by `geo::Haversine`, in kilometers.
pub const MEAN_EARTH_RADIUS_KM: f64 = 6371.0088;

/// A point on the Earth's surface in decimal degrees.
///
/// Constructed latitude first, the way callers and the snapshot data name
/// coordinates. Internally stored as `geo::Point` (x = longitude,
/// y = latitude).
///
/// # Examples
///
/// ```
/// use satpos_types::GeoPoint;
///
/// let point = GeoPoint::new(-40.4098530291677, 108.0);
/// assert_eq!(point.lat(), -40.4098530291677);
/// assert_eq!(point.lon(), 108.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    inner: geo::Point<f64>,
}

impl GeoPoint {
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            inner: geo::Point::new(longitude, latitude),
        }
    }

    /// Latitude in degrees.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.inner.y()
    }

    /// Longitude in degrees.
    #[inline]
    pub fn lon(&self) -> f64 {
        self.inner.x()
    }

    #[inline]
    pub fn inner(&self) -> &geo::Point<f64> {
        &self.inner
    }

    #[inline]
    pub fn into_inner(self) -> geo::Point<f64> {
        self.inner
    }

    /// Haversine distance to another point in meters.
    ///
    /// ```
    /// use satpos_types::GeoPoint;
    ///
    /// let nyc = GeoPoint::new(40.7128, -74.0060);
    /// let la = GeoPoint::new(34.0522, -118.2437);
    /// assert!(nyc.haversine_distance(&la) > 3_900_000.0);
    /// ```
    #[inline]
    pub fn haversine_distance(&self, other: &GeoPoint) -> f64 {
        use geo::Distance;
        geo::Haversine.distance(self.inner, other.inner)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(inner: geo::Point<f64>) -> Self {
        Self { inner }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat(), self.lon())
    }
}

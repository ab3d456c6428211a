use crate::Timestamp;
use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// A single recorded position of a tracked satellite.
///
/// Coordinates are optional: the source snapshot contains entries whose
/// position is unknown. Such records are stored and returned by point
/// lookups but never take part in distance computations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub time: Timestamp,
    pub entity_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PositionRecord {
    pub fn new(
        time: Timestamp,
        entity_id: impl Into<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        Self {
            time,
            entity_id: entity_id.into(),
            latitude,
            longitude,
        }
    }

    /// The recorded position, if both coordinates are present.
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }

    #[inline]
    pub fn has_position(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

impl std::fmt::Display for PositionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn coord(value: Option<f64>) -> String {
            value.map_or_else(|| "null".to_string(), |v| v.to_string())
        }

        write!(
            f,
            "time: {} | satellite_id: {} | latitude: {} | longitude: {}",
            self.time.format("%Y-%m-%dT%H:%M:%S%.f"),
            self.entity_id,
            coord(self.latitude),
            coord(self.longitude)
        )
    }
}

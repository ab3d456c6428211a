//! Starlink historical snapshot ingestion.
//!
//! The snapshot is a JSON array of SpaceX API objects. Only the creation
//! time, the satellite id and the sub-satellite point are read; every other
//! field is ignored.

use crate::error::{Result, SatposError};
use crate::time::parse_timestamp;
use satpos_types::PositionRecord;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SpaceTrack {
    #[serde(rename = "CREATION_DATE")]
    creation_date: String,
}

#[derive(Debug, Deserialize)]
struct StarlinkEntry {
    #[serde(rename = "spaceTrack")]
    space_track: SpaceTrack,
    id: String,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl StarlinkEntry {
    fn into_record(self, index: usize) -> Result<PositionRecord> {
        let time = parse_timestamp(&self.space_track.creation_date).map_err(|_| {
            SatposError::InvalidInput(format!(
                "entry {}: invalid CREATION_DATE '{}'",
                index, self.space_track.creation_date
            ))
        })?;
        Ok(PositionRecord::new(
            time,
            self.id,
            self.latitude,
            self.longitude,
        ))
    }
}

fn convert(entries: Vec<serde_json::Value>) -> Result<Vec<PositionRecord>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let entry: StarlinkEntry = serde_json::from_value(value)
                .map_err(|e| SatposError::InvalidInput(format!("entry {}: {}", index, e)))?;
            entry.into_record(index)
        })
        .collect()
}

/// Parse a Starlink snapshot held in memory.
pub fn parse_snapshot(json: &str) -> Result<Vec<PositionRecord>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| SatposError::InvalidInput(format!("snapshot is not a JSON array: {}", e)))?;
    convert(entries)
}

/// Read and parse a Starlink snapshot file.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Vec<PositionRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        SatposError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot open {}: {}", path.display(), e),
        ))
    })?;

    let entries: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| {
            SatposError::InvalidInput(format!("{} is not a JSON array: {}", path.display(), e))
        })?;

    let records = convert(entries)?;
    log::info!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "spaceTrack": {
                "CREATION_DATE": "2020-05-19T06:26:10",
                "OBJECT_NAME": "STARLINK-1506",
                "EPOCH": "2020-05-18T21:26:10.000192"
            },
            "version": "v1.0",
            "launch": "5eb87d46ffd86e000604b388",
            "id": "60106f20e900d60006e32cc3",
            "height_km": 550.3,
            "latitude": 5.423581610589942,
            "longitude": 2.0,
            "velocity_kms": 7.59
        },
        {
            "spaceTrack": { "CREATION_DATE": "2020-05-19T06:26:10" },
            "id": "5eed7714096e59000698580c",
            "latitude": null,
            "longitude": null
        }
    ]"#;

    #[test]
    fn test_parse_snapshot() {
        let records = parse_snapshot(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].entity_id, "60106f20e900d60006e32cc3");
        assert_eq!(records[0].latitude, Some(5.423581610589942));
        assert_eq!(records[0].longitude, Some(2.0));
        assert_eq!(
            records[0].time,
            parse_timestamp("2020-05-19T06:26:10").unwrap()
        );

        assert!(!records[1].has_position());
    }

    #[test]
    fn test_missing_coordinates_read_as_null() {
        let records =
            parse_snapshot(r#"[{"spaceTrack": {"CREATION_DATE": "2020-05-19"}, "id": "x"}]"#)
                .unwrap();
        assert_eq!(records[0].latitude, None);
        assert_eq!(records[0].longitude, None);
    }

    #[test]
    fn test_bad_date_names_entry() {
        let json = r#"[
            {"spaceTrack": {"CREATION_DATE": "2020-05-19T06:26:10"}, "id": "a"},
            {"spaceTrack": {"CREATION_DATE": "yesterday"}, "id": "b"}
        ]"#;
        let err = parse_snapshot(json).unwrap_err();
        match err {
            SatposError::InvalidInput(msg) => assert!(msg.starts_with("entry 1:"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_id_names_entry() {
        let json = r#"[{"spaceTrack": {"CREATION_DATE": "2020-05-19T06:26:10"}}]"#;
        let err = parse_snapshot(json).unwrap_err();
        assert!(err.to_string().contains("entry 0"));
    }

    #[test]
    fn test_not_an_array() {
        assert!(matches!(
            parse_snapshot(r#"{"id": "a"}"#),
            Err(SatposError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_read_snapshot_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("starlink.json");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(read_snapshot(&path).unwrap().len(), 2);

        let missing = read_snapshot(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, SatposError::Io(_)));
    }
}

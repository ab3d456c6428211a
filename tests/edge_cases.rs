use satpos::time::parse_timestamp;
use satpos::{
    CancellationToken, Config, GeoPoint, MemoryStore, PositionRecord, SatelliteTracker,
    SatposError, TableAdmin, Timestamp, distance_km, ingest,
};
use std::sync::Arc;

fn ts(s: &str) -> Timestamp {
    parse_timestamp(s).unwrap()
}

fn tracker_with(records: Vec<PositionRecord>) -> SatelliteTracker<MemoryStore> {
    let store = MemoryStore::new();
    store.load(records).unwrap();
    SatelliteTracker::new(Arc::new(store))
}

#[test]
fn test_distance_properties() {
    let points = [
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(90.0, 0.0),
        GeoPoint::new(-90.0, 180.0),
        GeoPoint::new(-40.4098530291677, 108.0),
        GeoPoint::new(5.423581610589942, 2.0),
        GeoPoint::new(51.5074, -0.1278),
        GeoPoint::new(0.0, -180.0),
    ];

    for a in &points {
        assert_eq!(distance_km(a, a), 0.0);
        for b in &points {
            let ab = distance_km(a, b);
            assert!(ab >= 0.0);
            assert!((ab - distance_km(b, a)).abs() < 1e-9);
        }
    }
}

#[test]
fn test_antimeridian_points_are_close() {
    let west = GeoPoint::new(0.0, 179.9);
    let east = GeoPoint::new(0.0, -179.9);
    assert!(distance_km(&west, &east) < 23.0);
}

#[test]
fn test_reference_point_bounds() {
    let tracker = tracker_with(Vec::new());

    for (lat, lon) in [
        (90.5, 0.0),
        (-90.5, 0.0),
        (0.0, 180.5),
        (0.0, -180.5),
        (f64::NAN, 0.0),
        (0.0, f64::INFINITY),
    ] {
        let err = tracker.closest_satellite(lat, lon, None).unwrap_err();
        assert!(matches!(err, SatposError::InvalidInput(_)), "{} {}", lat, lon);
    }

    for (lat, lon) in [(90.0, 180.0), (-90.0, -180.0)] {
        assert!(tracker.closest_satellite(lat, lon, None).unwrap().is_none());
    }
}

#[test]
fn test_unparsable_timestamps() {
    for input in ["", "yesterday", "2021-13-01T00:00:00", "2021-01-26T05:00:00Z", "1611637200"] {
        assert!(
            matches!(
                parse_timestamp(input),
                Err(SatposError::InvalidTimestamp { .. })
            ),
            "{}",
            input
        );
    }
}

#[test]
fn test_accepted_timestamp_shapes() {
    let expected = ts("2021-01-26T05:00:00");
    assert_eq!(ts("2021-01-26 05:00:00"), expected);
    assert_eq!(ts("2021-01-26T05:00"), expected);
    assert_eq!(ts(" 2021-01-26T05:00:00 "), expected);
    assert_eq!(ts("2021-01-26"), ts("2021-01-26T00:00:00"));
    assert!(ts("2021-01-26T05:00:00.000001") > expected);
}

#[test]
fn test_no_record_between_result_and_cutoff() {
    let base = ts("2020-05-19T00:00:00");
    let records: Vec<PositionRecord> = (0..50)
        .map(|i| {
            PositionRecord::new(
                base + chrono::Duration::seconds(i * 37 % 1000),
                "sat",
                Some(i as f64 % 80.0),
                Some(i as f64 % 170.0),
            )
        })
        .collect();
    let tracker = tracker_with(records.clone());

    for offset in [0, 1, 36, 500, 999, 5000] {
        let cutoff = base + chrono::Duration::seconds(offset);
        let result = tracker.last_position("sat", Some(cutoff)).unwrap().unwrap();
        assert!(result.time <= cutoff);
        assert!(
            !records
                .iter()
                .any(|r| r.time > result.time && r.time <= cutoff)
        );
    }

    assert!(
        tracker
            .last_position("sat", Some(base - chrono::Duration::seconds(1)))
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_equal_distance_prefers_smaller_id() {
    let time = ts("2020-05-19T06:26:10");
    let tracker = tracker_with(vec![
        PositionRecord::new(time, "sat-b", Some(0.0), Some(10.0)),
        PositionRecord::new(time, "sat-a", Some(0.0), Some(-10.0)),
        PositionRecord::new(time, "sat-c", Some(20.0), Some(0.0)),
    ]);

    let closest = tracker.closest_satellite(0.0, 0.0, None).unwrap().unwrap();
    assert_eq!(closest.record.entity_id, "sat-a");
}

#[test]
fn test_blank_satellite_ids_are_queryable() {
    let json = r#"[
        {"spaceTrack": {"CREATION_DATE": "2020-05-19T06:26:10"}, "id": "", "latitude": 1.0, "longitude": 1.0},
        {"spaceTrack": {"CREATION_DATE": "2020-05-19T06:26:10"}, "id": " ", "latitude": 2.0, "longitude": 2.0}
    ]"#;
    let tracker = tracker_with(ingest::parse_snapshot(json).unwrap());

    let stored = tracker.last_positions(None).unwrap();
    assert_eq!(stored.len(), 2);
    for record in &stored {
        let found = tracker.last_position(&record.entity_id, None).unwrap();
        assert_eq!(found.as_ref(), Some(record));
    }
    assert!(tracker.last_position("  ", None).unwrap().is_none());
}

#[test]
fn test_cancelled_token_aborts_queries() {
    let tracker = tracker_with(vec![PositionRecord::new(
        ts("2020-05-19T06:26:10"),
        "sat",
        Some(1.0),
        Some(1.0),
    )]);
    let token = CancellationToken::new();
    token.cancel();
    let cancelled = tracker.with_cancellation(token);

    assert!(matches!(
        cancelled.last_position("sat", None),
        Err(SatposError::Cancelled)
    ));
    assert!(matches!(
        cancelled.closest_satellite(0.0, 0.0, None),
        Err(SatposError::Cancelled)
    ));
}

#[test]
fn test_malformed_snapshot_input() {
    assert!(ingest::parse_snapshot("not json").is_err());
    assert!(ingest::parse_snapshot("[]").unwrap().is_empty());

    let wrong_type = r#"[{"spaceTrack": {"CREATION_DATE": "2020-05-19T06:26:10"}, "id": "a", "latitude": "north"}]"#;
    let err = ingest::parse_snapshot(wrong_type).unwrap_err();
    assert!(err.to_string().contains("entry 0"));
}

#[test]
fn test_config_rejects_injection_in_table_name() {
    for name in ["positions; DROP TABLE x", "positions--", "", "1abc", "a b"] {
        let config = Config::default().with_table_name(name);
        assert!(
            matches!(config.validate(), Err(SatposError::Config(_))),
            "{:?}",
            name
        );
    }
}

use super::*;

#[test]
fn parses_wrapped_batch_in_order() {
    let batch = WaypointBatch::from_json_str(
        r#"{"waypoints": [
            {"id": "w1", "activationStart": 0, "activationDuration": 30,
             "scene": {"mood": "calm", "layoutHints": [[0.1, 0.1], [0.9, 0.9]]}},
            {"id": "w2", "activationStart": 30, "activationDuration": 70}
        ]}"#,
    )
    .unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.waypoints()[0].id, "w1");
    assert_eq!(batch.waypoints()[0].scene.layout_hints.len(), 2);
    assert_eq!(batch.waypoints()[1].scene.layout_hints.len(), 1);
    assert!(batch.overlapping_windows().is_empty());
}

#[test]
fn rejects_non_batch_json() {
    let err = WaypointBatch::from_json_str(r#"{"scenes": []}"#).unwrap_err();
    assert!(err.to_string().contains("serialization error:"));
    assert!(WaypointBatch::from_json_str("not json").is_err());
}

#[test]
fn reports_overlapping_windows() {
    let batch = WaypointBatch::new(vec![
        Waypoint::new("a", 0.0, 50.0),
        Waypoint::new("b", 40.0, 20.0),
        Waypoint::new("c", 60.0, 10.0),
    ]);
    assert_eq!(batch.overlapping_windows(), vec![("a", "b")]);
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = WaypointBatch::from_path("/nonexistent/scrollstage/batch.json").unwrap_err();
    assert!(err.to_string().contains("validation error:"));
}

use super::*;
use serde_json::json;

#[test]
fn batch_accepts_wrapped_and_bare_arrays() {
    let wrapped: BatchDef =
        serde_json::from_value(json!({"waypoints": [{"id": "a"}, {"id": "b"}]})).unwrap();
    assert_eq!(wrapped.waypoints.len(), 2);

    let bare: BatchDef = serde_json::from_value(json!([{"id": "a"}])).unwrap();
    assert_eq!(bare.waypoints[0].id.as_deref(), Some("a"));
}

#[test]
fn wrong_typed_scalars_become_none() {
    let wp: WaypointDef = serde_json::from_value(json!({
        "id": 7,
        "activationStart": "soon",
        "activationDuration": null,
        "scene": {"intensity": "high", "durationMs": 1500, "easingName": false}
    }))
    .unwrap();
    assert_eq!(wp.id.as_deref(), Some("7"));
    assert_eq!(wp.activation_start, None);
    assert_eq!(wp.activation_duration, None);
    let scene = wp.scene.unwrap();
    assert_eq!(scene.intensity, None);
    assert_eq!(scene.duration_ms, Some(1500.0));
    assert_eq!(scene.easing_name, None);
}

#[test]
fn numeric_strings_parse_as_numbers() {
    let wp: WaypointDef = serde_json::from_value(json!({
        "id": "a",
        "activationStart": "30",
        "activationDuration": " 12.5 ",
        "scene": {"intensity": "NaN", "durationMs": "inf"}
    }))
    .unwrap();
    assert_eq!(wp.activation_start, Some(30.0));
    assert_eq!(wp.activation_duration, Some(12.5));
    let scene = wp.scene.unwrap();
    assert_eq!(scene.intensity, None);
    assert_eq!(scene.duration_ms, None);
}

#[test]
fn hint_shapes_parse_and_malformed_entries_drop() {
    let arr = HintDef::from_value(&json!([0.1, 0.2])).unwrap();
    assert_eq!((arr.x, arr.y, arr.label), (0.1, 0.2, None));

    let labeled = HintDef::from_value(&json!([0.3, 0.4, "door"])).unwrap();
    assert_eq!(labeled.label.as_deref(), Some("door"));

    let obj = HintDef::from_value(&json!({"x": 0.5, "y": 0.6, "label": "hall"})).unwrap();
    assert_eq!((obj.x, obj.y), (0.5, 0.6));

    assert!(HintDef::from_value(&json!(["0.1", 0.2])).is_none());
    assert!(HintDef::from_value(&json!({"x": 0.1})).is_none());
    assert!(HintDef::from_value(&json!([0.1])).is_none());
    assert!(HintDef::from_value(&json!("center")).is_none());
}

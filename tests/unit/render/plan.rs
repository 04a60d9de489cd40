use super::*;

fn marker(x: f64) -> DrawOp {
    DrawOp::Marker {
        center: Point::new(x, 4.0),
        radius: 2.0,
        color: Rgba8::rgb(1, 2, 3),
    }
}

#[test]
fn push_drops_non_finite_ops() {
    let mut plan = FramePlan::new(10, 10);
    plan.push(marker(1.0));
    plan.push(marker(f64::NAN));
    plan.push(DrawOp::DashedPath {
        points: vec![Point::new(0.0, 0.0), Point::new(f64::INFINITY, 1.0)],
        color: Rgba8::rgb(0, 0, 0),
        width: 1.0,
        dash: [4.0, 4.0],
    });
    assert_eq!(plan.ops.len(), 1);
    assert_eq!(plan.count("marker"), 1);
    assert_eq!(plan.count("dashed-path"), 0);
}

#[test]
fn glyph_with_nan_heading_is_not_finite() {
    let op = DrawOp::Glyph {
        center: Point::new(1.0, 1.0),
        radius: 3.0,
        heading: f64::NAN,
        color: Rgba8::rgb(0, 0, 0),
        glow_radius: 5.0,
        glow_opacity: 0.2,
    };
    assert!(!op.is_finite());
    assert_eq!(op.kind(), "glyph");
}

#[test]
fn ops_serialize_with_tag() {
    let json = serde_json::to_value(marker(2.0)).unwrap();
    assert_eq!(json["op"], "marker");
    assert_eq!(json["radius"], 2.0);
}

use super::*;

#[test]
fn viewport_rejects_non_finite() {
    assert!(Viewport::new(f64::NAN, 10.0).is_err());
    assert!(Viewport::new(10.0, -1.0).is_err());
    assert!(Viewport::new(0.0, 0.0).unwrap().is_empty());
}

#[test]
fn viewport_norm_px_roundtrip() {
    let vp = Viewport::new(800.0, 400.0).unwrap();
    let px = vp.to_px(Point::new(0.25, 0.5));
    assert_eq!(px, Point::new(200.0, 200.0));
    assert_eq!(vp.to_norm(px), Point::new(0.25, 0.5));
}

#[test]
fn degenerate_viewport_maps_to_center() {
    let vp = Viewport::new(0.0, 100.0).unwrap();
    assert_eq!(vp.to_norm(Point::new(3.0, 4.0)), Point::new(0.5, 0.5));
}

#[test]
fn premul_scales_channels() {
    let c = Rgba8::rgb(255, 128, 0).with_opacity(0.5);
    let [r, g, b, a] = c.to_premul();
    assert_eq!(a, 128);
    assert_eq!(r, 128);
    assert_eq!(g, 64);
    assert_eq!(b, 0);
}

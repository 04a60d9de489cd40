use super::*;

#[test]
fn transparent_frame_has_no_painted_pixels() {
    let f = FrameRGBA::transparent(3, 2);
    assert_eq!(f.data.len(), 24);
    assert_eq!(f.painted_pixels(), 0);
    assert_eq!(f.pixel(2, 1), Some([0, 0, 0, 0]));
    assert_eq!(f.pixel(3, 0), None);
}

#[test]
fn unpremultiply_restores_straight_alpha() {
    let mut f = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![64, 0, 32, 128, 10, 20, 30, 255],
        premultiplied: true,
    };
    f.unpremultiply();
    assert!(!f.premultiplied);
    assert_eq!(f.pixel(0, 0), Some([128, 0, 64, 128]));
    assert_eq!(f.pixel(1, 0), Some([10, 20, 30, 255]));

    // Second call is a no-op.
    f.unpremultiply();
    assert_eq!(f.pixel(0, 0), Some([128, 0, 64, 128]));
}

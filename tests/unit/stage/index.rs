use super::*;

fn vp(w: f64, h: f64) -> Viewport {
    Viewport::new(w, h).unwrap()
}

#[test]
fn empty_document_marks_every_sample_free() {
    let mut idx = StageSpaceIndex::new(StageOpts::default());
    let samples = idx.rebuild(vp(90.0, 90.0), &Vec::<ContentBox>::new());
    assert_eq!(samples.len(), 4);
    assert!(samples.iter().all(|s| s.free));
    assert_eq!(idx.source(), StageSource::Inspected);
}

#[test]
fn padded_content_occupies_neighbouring_cells() {
    let opts = StageOpts {
        grid_step_px: 10.0,
        padding_px: 5.0,
        ..StageOpts::default()
    };
    let mut idx = StageSpaceIndex::new(opts);
    let content = vec![ContentBox::text(Rect::new(40.0, 40.0, 60.0, 60.0))];
    idx.rebuild(vp(100.0, 100.0), &content);

    let occupied: Vec<Point> = idx
        .samples()
        .iter()
        .filter(|s| !s.free)
        .map(|s| s.pos)
        .collect();
    // Inflated box is [35, 65]^2, touching cells 30..70 in each axis.
    assert_eq!(occupied.len(), 16);
    assert!(occupied.contains(&Point::new(35.0, 35.0)));
    assert!(occupied.contains(&Point::new(65.0, 65.0)));
    assert!(!occupied.contains(&Point::new(25.0, 25.0)));
    assert_eq!(idx.free_samples().len(), 100 - 16);
}

#[test]
fn invisible_empty_and_zero_sized_boxes_are_ignored() {
    let mut idx = StageSpaceIndex::new(StageOpts::default());
    let hidden = ContentBox {
        visible: false,
        ..ContentBox::text(Rect::new(0.0, 0.0, 90.0, 90.0))
    };
    let decorative = ContentBox {
        has_text: false,
        ..ContentBox::text(Rect::new(0.0, 0.0, 90.0, 90.0))
    };
    let zero = ContentBox::image(Rect::new(10.0, 10.0, 10.0, 50.0));
    idx.rebuild(vp(90.0, 90.0), &vec![hidden, decorative, zero]);
    assert!(idx.samples().iter().all(|s| s.free));
}

#[test]
fn uninspectable_content_uses_fallback_policy() {
    let mut idx = StageSpaceIndex::new(StageOpts::default());
    idx.rebuild(vp(450.0, 450.0), &Uninspectable);
    assert_eq!(idx.source(), StageSource::Fallback);
    assert_eq!(idx.free_samples().len(), idx.samples().len());

    let opts = StageOpts {
        grid_step_px: 50.0,
        fallback: FallbackPolicy::ViewportMargins { margin_px: 60.0 },
        ..StageOpts::default()
    };
    let mut idx = StageSpaceIndex::new(opts);
    idx.rebuild(vp(300.0, 300.0), &Uninspectable);
    assert!(idx.free_samples().contains(&Point::new(25.0, 25.0)));
    assert!(!idx.free_samples().contains(&Point::new(125.0, 125.0)));
}

#[test]
fn snap_returns_a_free_sample_or_the_input() {
    let opts = StageOpts {
        grid_step_px: 10.0,
        padding_px: 0.0,
        ..StageOpts::default()
    };
    let mut idx = StageSpaceIndex::new(opts);
    let probe = Point::new(47.0, 52.0);
    assert_eq!(idx.snap(probe), probe);

    idx.rebuild(
        vp(100.0, 100.0),
        &vec![ContentBox::text(Rect::new(30.0, 30.0, 70.0, 70.0))],
    );
    for p in [probe, Point::new(0.0, 0.0), Point::new(99.0, 1.0)] {
        let s = idx.snap(p);
        assert!(idx.free_samples().contains(&s), "{s:?}");
    }
    assert_eq!(idx.snap(Point::new(1.0, 1.0)), Point::new(5.0, 5.0));
}

#[test]
fn fully_occupied_viewport_leaves_input_unmodified() {
    let mut idx = StageSpaceIndex::new(StageOpts::default());
    idx.rebuild(
        vp(90.0, 90.0),
        &vec![ContentBox::text(Rect::new(-10.0, -10.0, 200.0, 200.0))],
    );
    assert!(idx.free_samples().is_empty());
    let p = Point::new(12.0, 34.0);
    assert_eq!(idx.snap(p), p);
}

#[test]
fn rebuild_requests_are_debounced() {
    let mut idx = StageSpaceIndex::new(StageOpts::default());
    let content = Vec::<ContentBox>::new();
    assert!(!idx.rebuild_if_due(0.0, vp(90.0, 90.0), &content));

    idx.request_rebuild(0.0);
    assert!(idx.rebuild_if_due(0.0, vp(90.0, 90.0), &content));
    assert_eq!(idx.builds(), 1);

    for t in [10.0, 40.0, 90.0] {
        idx.request_rebuild(t);
        assert!(!idx.rebuild_if_due(t, vp(90.0, 90.0), &content));
    }
    assert!(!idx.rebuild_if_due(200.0, vp(90.0, 90.0), &content));
    assert!(idx.rebuild_if_due(240.0, vp(180.0, 90.0), &content));
    assert_eq!(idx.builds(), 2);
    assert_eq!(idx.samples().len(), 8);
    assert!(!idx.is_dirty());
}

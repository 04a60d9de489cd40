use super::*;
use std::cell::RefCell;
use std::rc::Rc;

fn two_windows() -> WaypointOrchestrator {
    WaypointOrchestrator::new(WaypointBatch::new(vec![
        Waypoint::new("w1", 0.0, 30.0),
        Waypoint::new("w2", 30.0, 70.0),
    ]))
}

fn record(o: &mut WaypointOrchestrator) -> Rc<RefCell<Vec<SceneChange>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    o.on_change(Box::new(move |c: &SceneChange| sink.borrow_mut().push(c.clone())));
    log
}

#[test]
fn boundary_hands_over_to_next_window() {
    let mut o = two_windows();
    assert_eq!(o.update(29.9).1, Some("w1"));
    assert_eq!(o.update(30.0).1, Some("w2"));
    assert_eq!(o.update(100.0).1, Some("w2"));
}

#[test]
fn empty_batch_always_resolves_nothing() {
    let mut o = WaypointOrchestrator::default();
    let log = record(&mut o);
    for f in [0.0, 50.0, 100.0] {
        let (scene, id) = o.update(f);
        assert!(scene.is_none());
        assert!(id.is_none());
    }
    assert!(log.borrow().is_empty());
}

#[test]
fn monotonic_feed_emits_one_event_per_crossing() {
    let mut o = WaypointOrchestrator::new(WaypointBatch::new(vec![
        Waypoint::new("a", 10.0, 20.0),
        Waypoint::new("b", 30.0, 20.0),
        Waypoint::new("c", 60.0, 40.0),
    ]));
    let log = record(&mut o);
    for i in 0..=1000 {
        o.update(f64::from(i) / 10.0);
    }
    let ids: Vec<Option<String>> = log.borrow().iter().map(|c| c.current.clone()).collect();
    // 10: a, 30: b, 50: gap, 60: c.
    assert_eq!(
        ids,
        vec![
            Some("a".to_owned()),
            Some("b".to_owned()),
            None,
            Some("c".to_owned())
        ]
    );
    assert_eq!(o.change_count(), 4);
    assert_eq!(log.borrow()[1].previous.as_deref(), Some("a"));
}

#[test]
fn repeated_input_is_idempotent() {
    let mut o = two_windows();
    let log = record(&mut o);
    for _ in 0..5 {
        o.update(12.0);
    }
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn overlapping_windows_resolve_by_list_order() {
    let mut o = WaypointOrchestrator::new(WaypointBatch::new(vec![
        Waypoint::new("first", 0.0, 60.0),
        Waypoint::new("second", 40.0, 60.0),
    ]));
    assert_eq!(o.update(50.0).1, Some("first"));
    assert_eq!(o.update(70.0).1, Some("second"));
}

#[test]
fn non_finite_input_keeps_previous_resolution() {
    let mut o = two_windows();
    o.update(10.0);
    assert_eq!(o.update(f64::NAN).1, Some("w1"));
    assert_eq!(o.last_fraction(), Some(10.0));
}

#[test]
fn replacing_batch_resets_resolution() {
    let mut o = two_windows();
    let log = record(&mut o);
    o.update(10.0);
    o.replace_batch(WaypointBatch::new(vec![Waypoint::new("only", 0.0, 100.0)]));
    assert!(o.active_id().is_none());
    assert_eq!(o.update(10.0).1, Some("only"));
    assert_eq!(log.borrow().len(), 2);
    assert_eq!(log.borrow()[1].previous, None);
}

#[test]
fn windows_sharing_an_id_emit_one_change() {
    let mut o = WaypointOrchestrator::new(WaypointBatch::new(vec![
        Waypoint::new("a", 0.0, 50.0),
        Waypoint::new("a", 50.0, 50.0),
    ]));
    let log = record(&mut o);
    o.update(10.0);
    assert_eq!(o.update(60.0).1, Some("a"));
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(o.change_count(), 1);
    assert_eq!(o.active().map(|w| w.activation_start), Some(50.0));
}

use super::*;
use serde_json::json;

fn report(f: f64) -> ScrollReport {
    ScrollReport {
        scroll_fraction: f,
        scroll_offset_px: f * 10.0,
        viewport_height_px: 800.0,
        document_height_px: 1800.0,
    }
}

#[test]
fn envelope_wire_shape_matches_schema() {
    let env = Envelope::scroll_report(&report(12.5)).unwrap();
    let v = serde_json::to_value(&env).unwrap();
    assert_eq!(v["type"], "scroll-report");
    assert_eq!(v["payload"]["scrollFraction"], 12.5);
    assert_eq!(v["payload"]["viewportHeightPx"], 800.0);
    assert_eq!(v["payload"]["documentHeightPx"], 1800.0);
}

#[test]
fn payload_validation_discards_malformed() {
    assert!(ScrollReport::from_payload(&json!({"scrollFraction": 10})).is_none());
    assert!(
        ScrollReport::from_payload(&json!({
            "scrollFraction": "10", "scrollOffsetPx": 0,
            "viewportHeightPx": 1, "documentHeightPx": 1
        }))
        .is_none()
    );
    assert!(
        ScrollReport::from_payload(&json!({
            "scrollFraction": 10, "scrollOffsetPx": 0,
            "viewportHeightPx": -1, "documentHeightPx": 1
        }))
        .is_none()
    );
    let clamped = ScrollReport::from_payload(&json!({
        "scrollFraction": 100.4, "scrollOffsetPx": 0,
        "viewportHeightPx": 1, "documentHeightPx": 1
    }))
    .unwrap();
    assert_eq!(clamped.scroll_fraction, 100.0);
}

#[test]
fn delivery_is_deferred_until_pumped() {
    let t = InProcessTransport::new();
    let seen = Rc::new(Cell::new(0usize));
    let seen2 = seen.clone();
    t.on_receive(Box::new(move |_| seen2.set(seen2.get() + 1)));

    t.send(Envelope::scroll_report(&report(1.0)).unwrap()).unwrap();
    t.send(Envelope::scroll_report(&report(2.0)).unwrap()).unwrap();
    assert_eq!(seen.get(), 0);
    assert_eq!(t.pending_len(), 2);

    assert_eq!(t.deliver_pending(), 2);
    assert_eq!(seen.get(), 2);
    assert_eq!(t.pending_len(), 0);
}

#[test]
fn removed_listener_stops_receiving() {
    let t = InProcessTransport::new();
    let seen = Rc::new(Cell::new(0usize));
    let seen2 = seen.clone();
    let id = t.on_receive(Box::new(move |_| seen2.set(seen2.get() + 1)));
    assert!(t.remove_listener(id));
    assert!(!t.remove_listener(id));

    t.send(Envelope::scroll_report(&report(1.0)).unwrap()).unwrap();
    t.deliver_pending();
    assert_eq!(seen.get(), 0);
    assert_eq!(t.listener_count(), 0);
}

#[test]
fn sends_from_handlers_queue_for_next_pump() {
    let t = InProcessTransport::new();
    let echo = t.clone();
    t.on_receive(Box::new(move |env| {
        if env.kind == "ping" {
            let _ = echo.send(Envelope {
                kind: "pong".to_owned(),
                payload: serde_json::Value::Null,
            });
        }
    }));
    t.send(Envelope {
        kind: "ping".to_owned(),
        payload: serde_json::Value::Null,
    })
    .unwrap();
    assert_eq!(t.deliver_pending(), 1);
    assert_eq!(t.pending_len(), 1);
    assert_eq!(t.discard_pending(), 1);
}

#[test]
fn bounded_channel_refuses_sends_when_full() {
    let t = InProcessTransport::with_max_pending(2);
    for f in [1.0, 2.0] {
        t.send(Envelope::scroll_report(&report(f)).unwrap()).unwrap();
    }
    let err = t
        .send(Envelope::scroll_report(&report(3.0)).unwrap())
        .unwrap_err();
    assert!(matches!(err, StageError::Transport(_)));
    assert_eq!(t.pending_len(), 2);

    t.deliver_pending();
    assert!(t.send(Envelope::scroll_report(&report(3.0)).unwrap()).is_ok());
}

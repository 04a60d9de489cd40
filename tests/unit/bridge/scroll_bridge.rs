use super::*;
use crate::bridge::clock::ManualClock;
use crate::bridge::reporter::ScrollMetrics;
use crate::bridge::transport::InProcessTransport;
use crate::foundation::error::{StageError, StageResult};

#[derive(Default)]
struct FakeDoc {
    load: u64,
    cross_origin: bool,
    installs: usize,
    reporter: Option<ScrollReporter>,
}

impl FakeDoc {
    fn scroll_to(&mut self, scroll_y: f64) {
        let r = self.reporter.as_mut().expect("reporter installed");
        r.on_scroll(ScrollMetrics {
            scroll_y,
            viewport_height: 1000.0,
            document_height: 3000.0,
        });
        r.on_animation_frame().unwrap();
    }
}

impl EmbeddedDocument for FakeDoc {
    fn load_id(&self) -> u64 {
        self.load
    }

    fn install_reporter(&mut self, reporter: ScrollReporter) -> StageResult<()> {
        self.installs += 1;
        if self.cross_origin {
            return Err(StageError::access("cross-origin frame"));
        }
        self.reporter = Some(reporter);
        Ok(())
    }
}

struct Harness {
    transport: InProcessTransport,
    clock: ManualClock,
    bridge: ScrollBridge,
    seen: Rc<RefCell<Vec<f64>>>,
}

fn harness() -> Harness {
    let transport = InProcessTransport::new();
    let clock = ManualClock::new(0.0);
    let bridge = ScrollBridge::new(
        BridgeOpts::default(),
        Rc::new(transport.clone()),
        Rc::new(clock.clone()),
    );
    Harness {
        transport,
        clock,
        bridge,
        seen: Rc::new(RefCell::new(Vec::new())),
    }
}

fn recorder(seen: &Rc<RefCell<Vec<f64>>>) -> Option<ReportCallback> {
    let seen = seen.clone();
    Some(Box::new(move |r: ScrollReport| {
        seen.borrow_mut().push(r.scroll_fraction)
    }))
}

#[test]
fn same_origin_document_bridges_reports() {
    let mut h = harness();
    let mut doc = FakeDoc::default();
    let state = h
        .bridge
        .attach(&mut doc, recorder(&h.seen), Liveness::new());
    assert_eq!(state, BridgeState::Bridged);

    doc.scroll_to(1000.0);
    h.transport.deliver_pending();
    assert_eq!(*h.seen.borrow(), vec![50.0]);
    assert_eq!(h.bridge.last_report().unwrap().scroll_fraction, 50.0);
    assert_eq!(h.bridge.stats().forwarded, 1);
}

#[test]
fn access_denial_degrades_without_error() {
    let mut h = harness();
    let mut doc = FakeDoc {
        cross_origin: true,
        ..FakeDoc::default()
    };
    let state = h
        .bridge
        .attach(&mut doc, recorder(&h.seen), Liveness::new());
    assert_eq!(state, BridgeState::Degraded);
    assert_eq!(h.transport.listener_count(), 0);
    assert!(h.bridge.last_report().is_none());
}

#[test]
fn injection_happens_once_per_load() {
    let mut h = harness();
    let mut doc = FakeDoc::default();
    h.bridge.attach(&mut doc, recorder(&h.seen), Liveness::new());
    h.bridge.attach(&mut doc, recorder(&h.seen), Liveness::new());
    assert_eq!(doc.installs, 1);
    assert_eq!(h.transport.listener_count(), 1);

    doc.load = 2;
    h.bridge.attach(&mut doc, recorder(&h.seen), Liveness::new());
    assert_eq!(doc.installs, 2);
    assert_eq!(h.transport.listener_count(), 1);
}

#[test]
fn reattach_silences_previous_reporter_and_in_flight_reports() {
    let mut h = harness();
    let mut old_doc = FakeDoc::default();
    h.bridge
        .attach(&mut old_doc, recorder(&h.seen), Liveness::new());
    old_doc.scroll_to(500.0);

    let mut new_doc = FakeDoc {
        load: 9,
        ..FakeDoc::default()
    };
    h.bridge
        .attach(&mut new_doc, recorder(&h.seen), Liveness::new());
    assert!(!old_doc.reporter.as_ref().unwrap().is_alive());

    // Drop whatever the old reporter posted before the switch; after it, it must stay silent.
    h.transport.discard_pending();
    old_doc.scroll_to(900.0);
    assert_eq!(h.transport.pending_len(), 0);

    h.clock.advance(100.0);
    new_doc.scroll_to(2000.0);
    h.transport.deliver_pending();
    assert_eq!(*h.seen.borrow(), vec![100.0]);
}

#[test]
fn throttle_drops_reports_inside_interval() {
    let mut h = harness();
    let mut doc = FakeDoc::default();
    h.bridge.attach(&mut doc, recorder(&h.seen), Liveness::new());

    // Ten reports 10ms apart span a 90ms window.
    for i in 0..10 {
        doc.scroll_to(100.0 * f64::from(i));
        h.transport.deliver_pending();
        h.clock.advance(10.0);
    }
    let forwarded = h.seen.borrow().len();
    let bound = (90.0_f64 / 50.0).floor() as usize + 1;
    assert!(forwarded <= bound, "{forwarded} > {bound}");
    assert_eq!(forwarded, 2);
    assert_eq!(h.bridge.stats().throttled, 8);
}

#[test]
fn foreign_and_malformed_messages_are_filtered() {
    let mut h = harness();
    let mut doc = FakeDoc::default();
    h.bridge.attach(&mut doc, recorder(&h.seen), Liveness::new());

    h.transport
        .send(Envelope {
            kind: "resize".to_owned(),
            payload: serde_json::json!({"scrollFraction": 10}),
        })
        .unwrap();
    h.transport
        .send(Envelope {
            kind: SCROLL_REPORT_TYPE.to_owned(),
            payload: serde_json::json!({"scrollFraction": "ten"}),
        })
        .unwrap();
    h.transport.deliver_pending();

    assert!(h.seen.borrow().is_empty());
    let stats = h.bridge.stats();
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.malformed, 1);
}

#[test]
fn missing_callback_is_a_no_op() {
    let mut h = harness();
    let mut doc = FakeDoc::default();
    assert_eq!(
        h.bridge.attach(&mut doc, None, Liveness::new()),
        BridgeState::Bridged
    );
    doc.scroll_to(300.0);
    h.transport.deliver_pending();
    assert_eq!(h.bridge.stats().forwarded, 1);
}

#[test]
fn inactive_host_discards_reports() {
    let mut h = harness();
    let mut doc = FakeDoc::default();
    let mounted = Liveness::new();
    h.bridge
        .attach(&mut doc, recorder(&h.seen), mounted.clone());
    mounted.kill();
    doc.scroll_to(300.0);
    h.transport.deliver_pending();
    assert!(h.seen.borrow().is_empty());
}

#[test]
fn duplicated_reports_are_idempotent() {
    let mut h = harness();
    let mut doc = FakeDoc::default();
    h.bridge.attach(&mut doc, recorder(&h.seen), Liveness::new());
    let env = Envelope::scroll_report(&ScrollMetrics {
        scroll_y: 1000.0,
        viewport_height: 1000.0,
        document_height: 3000.0,
    }
    .to_report())
    .unwrap();
    for _ in 0..3 {
        h.transport.send(env.clone()).unwrap();
        h.transport.deliver_pending();
        h.clock.advance(60.0);
    }
    assert!(h.seen.borrow().iter().all(|f| *f == 50.0));
}

#[test]
fn detach_returns_to_unattached() {
    let mut h = harness();
    let mut doc = FakeDoc::default();
    h.bridge.attach(&mut doc, recorder(&h.seen), Liveness::new());
    h.bridge.detach();
    assert_eq!(h.bridge.state(), BridgeState::Unattached);
    assert_eq!(h.transport.listener_count(), 0);
}

use crate::foundation::error::{StageError, StageResult};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Type tag carried by scroll report envelopes.
pub const SCROLL_REPORT_TYPE: &str = "scroll-report";

/// Tagged message crossing the document boundary.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Envelope {
    /// Message type tag; receivers ignore tags they do not own.
    #[serde(rename = "type")]
    pub kind: String,
    /// Untyped payload, validated by the receiver.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Build a scroll report envelope with the default type tag.
    pub fn scroll_report(report: &ScrollReport) -> StageResult<Self> {
        Self::tagged(SCROLL_REPORT_TYPE, report)
    }

    /// Build a scroll report envelope with an explicit type tag.
    pub fn tagged(kind: &str, report: &ScrollReport) -> StageResult<Self> {
        let payload = serde_json::to_value(report)
            .map_err(|e| StageError::serde(format!("encode scroll report: {e}")))?;
        Ok(Self {
            kind: kind.to_owned(),
            payload,
        })
    }
}

/// Scroll progress of the embedded document at one instant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollReport {
    /// Scroll progress in percent, `[0, 100]`.
    pub scroll_fraction: f64,
    /// Vertical scroll offset in pixels.
    pub scroll_offset_px: f64,
    /// Embedded viewport height in pixels.
    pub viewport_height_px: f64,
    /// Total document height in pixels.
    pub document_height_px: f64,
}

impl ScrollReport {
    /// Decode and validate a payload.
    ///
    /// Returns `None` for missing fields, non-numeric or non-finite values, and negative sizes.
    /// An in-range-but-noisy fraction is clamped into `[0, 100]`.
    pub fn from_payload(payload: &serde_json::Value) -> Option<Self> {
        let report: Self = serde_json::from_value(payload.clone()).ok()?;
        let finite = [
            report.scroll_fraction,
            report.scroll_offset_px,
            report.viewport_height_px,
            report.document_height_px,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite || report.viewport_height_px < 0.0 || report.document_height_px < 0.0 {
            return None;
        }
        Some(Self {
            scroll_fraction: report.scroll_fraction.clamp(0.0, 100.0),
            ..report
        })
    }
}

/// Handle returned by [`Transport::on_receive`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Receive callback registered on a transport.
pub type EnvelopeHandler = Box<dyn FnMut(&Envelope)>;

/// Asynchronous, unordered message channel between an embedded document and its host.
///
/// Delivery may be delayed, reordered or duplicated; receivers must be idempotent.
pub trait Transport {
    /// Post an envelope. Delivery happens later, never inside this call.
    fn send(&self, envelope: Envelope) -> StageResult<()>;

    /// Register a receive handler.
    fn on_receive(&self, handler: EnvelopeHandler) -> ListenerId;

    /// Unregister a handler; returns `false` if it was already gone.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

type SharedHandler = Rc<RefCell<EnvelopeHandler>>;

#[derive(Default)]
struct InProcessInner {
    queue: RefCell<VecDeque<Envelope>>,
    max_pending: Option<usize>,
    listeners: RefCell<Vec<(ListenerId, SharedHandler)>>,
    next_id: Cell<u64>,
}

/// Queue-backed transport living in one thread. Clones share the same channel.
///
/// Messages sit in a queue until [`InProcessTransport::deliver_pending`] is called, which models
/// the asynchronous hop of a real cross-document channel.
#[derive(Clone, Default)]
pub struct InProcessTransport {
    inner: Rc<InProcessInner>,
}

impl std::fmt::Debug for InProcessTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessTransport")
            .field("pending", &self.pending_len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl InProcessTransport {
    /// Empty channel with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel that refuses sends once `max_pending` envelopes are queued.
    pub fn with_max_pending(max_pending: usize) -> Self {
        Self {
            inner: Rc::new(InProcessInner {
                max_pending: Some(max_pending),
                ..InProcessInner::default()
            }),
        }
    }

    /// Number of queued, undelivered envelopes.
    pub fn pending_len(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Deliver every queued envelope to every listener, in queue order.
    ///
    /// Envelopes sent by handlers during delivery are queued for the next call. Returns the
    /// number of envelopes delivered.
    pub fn deliver_pending(&self) -> usize {
        let batch: Vec<Envelope> = self.inner.queue.borrow_mut().drain(..).collect();
        for envelope in &batch {
            let snapshot: Vec<(ListenerId, SharedHandler)> =
                self.inner.listeners.borrow().iter().cloned().collect();
            for (id, handler) in snapshot {
                // A handler removed by an earlier handler for this envelope must not fire.
                let still_registered = self
                    .inner
                    .listeners
                    .borrow()
                    .iter()
                    .any(|(other, _)| *other == id);
                if still_registered {
                    let mut h = handler.borrow_mut();
                    (*h)(envelope);
                }
            }
        }
        batch.len()
    }

    /// Drop queued envelopes without delivering them.
    pub fn discard_pending(&self) -> usize {
        let mut q = self.inner.queue.borrow_mut();
        let n = q.len();
        q.clear();
        n
    }
}

impl Transport for InProcessTransport {
    fn send(&self, envelope: Envelope) -> StageResult<()> {
        let mut queue = self.inner.queue.borrow_mut();
        if let Some(max) = self.inner.max_pending
            && queue.len() >= max
        {
            return Err(StageError::transport(format!(
                "channel full ({max} envelopes pending)"
            )));
        }
        queue.push_back(envelope);
        Ok(())
    }

    fn on_receive(&self, handler: EnvelopeHandler) -> ListenerId {
        let id = ListenerId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(handler))));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(other, _)| *other != id);
        listeners.len() != before
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/transport.rs"]
mod tests;

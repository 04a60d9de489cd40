use crate::bridge::transport::{Envelope, ScrollReport, Transport};
use crate::foundation::error::StageResult;
use std::cell::Cell;
use std::rc::Rc;

/// Shared on/off flag checked by deferred callbacks before they touch shared state.
///
/// Clones observe the same flag; once killed it never revives.
#[derive(Clone, Debug)]
pub struct Liveness {
    alive: Rc<Cell<bool>>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    /// A live flag.
    pub fn new() -> Self {
        Self {
            alive: Rc::new(Cell::new(true)),
        }
    }

    /// Whether the owner is still mounted/attached.
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Mark the owner gone.
    pub fn kill(&self) {
        self.alive.set(false);
    }
}

/// Raw scroll geometry read from the embedded document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    /// Vertical scroll offset in pixels.
    pub scroll_y: f64,
    /// Embedded viewport height in pixels.
    pub viewport_height: f64,
    /// Total document height in pixels.
    pub document_height: f64,
}

impl ScrollMetrics {
    /// Scroll progress in percent.
    ///
    /// `scroll_y / max(document_height - viewport_height, 0) * 100`, clamped to `[0, 100]`. A
    /// document that fits its viewport (no scroll range) and any non-finite input report `0`.
    pub fn scroll_fraction(self) -> f64 {
        let range = (self.document_height - self.viewport_height).max(0.0);
        if range <= 0.0 {
            return 0.0;
        }
        let f = self.scroll_y / range * 100.0;
        if f.is_finite() { f.clamp(0.0, 100.0) } else { 0.0 }
    }

    /// Build the wire report.
    pub fn to_report(self) -> ScrollReport {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        ScrollReport {
            scroll_fraction: self.scroll_fraction(),
            scroll_offset_px: finite(self.scroll_y),
            viewport_height_px: finite(self.viewport_height).max(0.0),
            document_height_px: finite(self.document_height).max(0.0),
        }
    }
}

/// Reporter living inside the embedded document.
///
/// Scroll events only record the latest metrics; one report per animation frame is posted from
/// [`ScrollReporter::on_animation_frame`]. Once its liveness flag is killed (host re-attached or
/// detached) the reporter drops pending work and stays silent.
pub struct ScrollReporter {
    transport: Rc<dyn Transport>,
    message_type: String,
    alive: Liveness,
    pending: Option<ScrollMetrics>,
    sent: u64,
}

impl std::fmt::Debug for ScrollReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollReporter")
            .field("message_type", &self.message_type)
            .field("alive", &self.alive.is_alive())
            .field("pending", &self.pending)
            .field("sent", &self.sent)
            .finish()
    }
}

impl ScrollReporter {
    pub(crate) fn new(transport: Rc<dyn Transport>, message_type: String, alive: Liveness) -> Self {
        Self {
            transport,
            message_type,
            alive,
            pending: None,
            sent: 0,
        }
    }

    /// Record a scroll event. Later events in the same frame replace earlier ones.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        if !self.alive.is_alive() {
            self.pending = None;
            return;
        }
        self.pending = Some(metrics);
    }

    /// Flush the pending report, if any. Returns `true` when a report was posted.
    pub fn on_animation_frame(&mut self) -> StageResult<bool> {
        let Some(metrics) = self.pending.take() else {
            return Ok(false);
        };
        if !self.alive.is_alive() {
            return Ok(false);
        }
        let envelope = Envelope::tagged(&self.message_type, &metrics.to_report())?;
        self.transport.send(envelope)?;
        self.sent += 1;
        Ok(true)
    }

    /// Whether a report is waiting for the next animation frame.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the host attachment that created this reporter is still current.
    pub fn is_alive(&self) -> bool {
        self.alive.is_alive()
    }

    /// Reports posted so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

/// Handle to a document displayed inside the host.
///
/// Implementations wrap whatever actually hosts the document (a browser frame, a webview, a test
/// double). Installing the reporter is the instrumentation step that may be refused.
pub trait EmbeddedDocument {
    /// Identifier of the current document load; changes on every navigation/reload.
    fn load_id(&self) -> u64;

    /// Hand the reporter to the document so it can drive it from scroll and frame events.
    ///
    /// Returns [`crate::StageError::Access`] when the document cannot be scripted (for example
    /// because it is cross-origin).
    fn install_reporter(&mut self, reporter: ScrollReporter) -> StageResult<()>;
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/reporter.rs"]
mod tests;

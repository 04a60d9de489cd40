use crate::bridge::clock::Clock;
use crate::bridge::reporter::{EmbeddedDocument, Liveness, ScrollReporter};
use crate::bridge::transport::{Envelope, ListenerId, SCROLL_REPORT_TYPE, ScrollReport, Transport};
use std::cell::RefCell;
use std::rc::Rc;

/// Callback receiving throttled scroll reports on the host.
pub type ReportCallback = Box<dyn FnMut(ScrollReport)>;

/// Bridge configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeOpts {
    /// Minimum wall-clock gap between forwarded reports. Reports inside the gap are dropped.
    pub throttle_ms: f64,
    /// Envelope type tag owned by this bridge.
    pub message_type: String,
}

impl Default for BridgeOpts {
    fn default() -> Self {
        Self {
            throttle_ms: 50.0,
            message_type: SCROLL_REPORT_TYPE.to_owned(),
        }
    }
}

impl BridgeOpts {
    /// Return options with a different throttle interval.
    pub fn with_throttle_ms(mut self, throttle_ms: f64) -> Self {
        self.throttle_ms = throttle_ms;
        self
    }
}

/// Attachment lifecycle.
///
/// `Unattached -> Injecting -> {Bridged | Degraded}`; a new document load restarts the cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeState {
    /// No document attached.
    Unattached,
    /// Reporter installation in progress.
    Injecting,
    /// Reporter installed; reports flow.
    Bridged,
    /// Instrumentation refused; no reports will arrive for this load.
    Degraded,
}

/// Host-side counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BridgeStats {
    /// Reports handed to the callback.
    pub forwarded: u64,
    /// Valid reports dropped by the throttle.
    pub throttled: u64,
    /// Envelopes with our tag but an invalid payload.
    pub malformed: u64,
    /// Envelopes with a foreign tag.
    pub ignored: u64,
}

struct HostSide {
    callback: Option<ReportCallback>,
    last_forward_ms: Option<f64>,
    last_report: Option<ScrollReport>,
    stats: BridgeStats,
}

/// Host end of the scroll synchronization channel.
///
/// Owns all per-reader bridge state: the registered transport listener, the liveness flag shared
/// with the installed reporter, throttle bookkeeping and the injection marker for the current
/// document load.
pub struct ScrollBridge {
    opts: BridgeOpts,
    transport: Rc<dyn Transport>,
    clock: Rc<dyn Clock>,
    state: BridgeState,
    attached_load: Option<u64>,
    listener: Option<ListenerId>,
    attachment: Liveness,
    host: Rc<RefCell<HostSide>>,
}

impl std::fmt::Debug for ScrollBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollBridge")
            .field("opts", &self.opts)
            .field("state", &self.state)
            .field("attached_load", &self.attached_load)
            .field("listener", &self.listener)
            .finish()
    }
}

impl ScrollBridge {
    /// Create an unattached bridge.
    pub fn new(opts: BridgeOpts, transport: Rc<dyn Transport>, clock: Rc<dyn Clock>) -> Self {
        let attachment = Liveness::new();
        attachment.kill();
        Self {
            opts,
            transport,
            clock,
            state: BridgeState::Unattached,
            attached_load: None,
            listener: None,
            attachment,
            host: Rc::new(RefCell::new(HostSide {
                callback: None,
                last_forward_ms: None,
                last_report: None,
                stats: BridgeStats::default(),
            })),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Host-side counters since the last attach.
    pub fn stats(&self) -> BridgeStats {
        self.host.borrow().stats
    }

    /// Most recent forwarded report, if any arrived since the last attach.
    pub fn last_report(&self) -> Option<ScrollReport> {
        self.host.borrow().last_report
    }

    /// Instrument `doc` and route its reports to `on_report`.
    ///
    /// Runs at most once per document load: calling again for the same [`EmbeddedDocument::load_id`]
    /// returns the current state untouched. A new load detaches the previous listener, silences
    /// the previous reporter and starts over. Instrumentation failure never propagates; the
    /// bridge enters [`BridgeState::Degraded`] instead.
    ///
    /// `is_active` is the host component's own liveness; reports arriving after it is killed are
    /// discarded. A `None` callback is accepted and makes the listener a no-op.
    #[tracing::instrument(skip_all, fields(load_id = doc.load_id()))]
    pub fn attach(
        &mut self,
        doc: &mut dyn EmbeddedDocument,
        on_report: Option<ReportCallback>,
        is_active: Liveness,
    ) -> BridgeState {
        let load_id = doc.load_id();
        if self.attached_load == Some(load_id)
            && matches!(self.state, BridgeState::Bridged | BridgeState::Degraded)
        {
            return self.state;
        }

        self.detach();
        self.attached_load = Some(load_id);
        self.state = BridgeState::Injecting;

        let attachment = Liveness::new();
        self.attachment = attachment.clone();
        {
            let mut host = self.host.borrow_mut();
            host.callback = on_report;
            host.last_forward_ms = None;
            host.last_report = None;
            host.stats = BridgeStats::default();
        }

        let reporter = ScrollReporter::new(
            self.transport.clone(),
            self.opts.message_type.clone(),
            attachment.clone(),
        );
        match doc.install_reporter(reporter) {
            Ok(()) => {
                self.listener = Some(self.register_listener(attachment, is_active));
                self.state = BridgeState::Bridged;
                tracing::debug!("scroll bridge attached");
            }
            Err(e) => {
                attachment.kill();
                self.state = BridgeState::Degraded;
                tracing::warn!(error = %e, "scroll instrumentation unavailable, running degraded");
            }
        }
        self.state
    }

    /// Remove the listener and silence the reporter of the current attachment.
    pub fn detach(&mut self) {
        self.attachment.kill();
        if let Some(id) = self.listener.take() {
            self.transport.remove_listener(id);
        }
        self.host.borrow_mut().callback = None;
        self.attached_load = None;
        self.state = BridgeState::Unattached;
    }

    fn register_listener(&self, attachment: Liveness, is_active: Liveness) -> ListenerId {
        let host = self.host.clone();
        let clock = self.clock.clone();
        let message_type = self.opts.message_type.clone();
        let throttle_ms = if self.opts.throttle_ms.is_finite() {
            self.opts.throttle_ms.max(0.0)
        } else {
            0.0
        };

        self.transport.on_receive(Box::new(move |envelope: &Envelope| {
            if !attachment.is_alive() || !is_active.is_alive() {
                return;
            }
            let Ok(mut side) = host.try_borrow_mut() else {
                return;
            };
            if envelope.kind != message_type {
                side.stats.ignored += 1;
                return;
            }
            let Some(report) = ScrollReport::from_payload(&envelope.payload) else {
                side.stats.malformed += 1;
                tracing::debug!("dropped malformed scroll report");
                return;
            };

            let now = clock.now_ms();
            if let Some(last) = side.last_forward_ms
                && now - last < throttle_ms
            {
                side.stats.throttled += 1;
                return;
            }
            side.last_forward_ms = Some(now);
            side.last_report = Some(report);
            side.stats.forwarded += 1;

            // Call without holding the borrow so the callback may query the bridge.
            let callback = side.callback.take();
            drop(side);
            if let Some(mut cb) = callback {
                cb(report);
                let mut side = host.borrow_mut();
                if side.callback.is_none() && attachment.is_alive() {
                    side.callback = Some(cb);
                }
            }
        }))
    }
}

impl Drop for ScrollBridge {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/scroll_bridge.rs"]
mod tests;

use crate::bridge::clock::Clock;
use crate::bridge::reporter::{EmbeddedDocument, Liveness};
use crate::bridge::scroll_bridge::{BridgeOpts, BridgeState, BridgeStats, ScrollBridge};
use crate::bridge::transport::{ScrollReport, Transport};
use crate::foundation::core::Viewport;
use crate::foundation::error::{StageError, StageResult};
use crate::orchestrate::waypoints::{ChangeHandler, WaypointOrchestrator};
use crate::render::backend::{FrameRGBA, RasterBackend};
use crate::render::motion::{MotionRenderer, RendererOpts, RendererState};
use crate::render::plan::FramePlan;
use crate::scene::batch::WaypointBatch;
use crate::stage::index::{ContentProbe, StageOpts, StageSource, StageSpaceIndex, Uninspectable};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

/// Environment variable toggling the stage-marker debug layer (`1`/`0`).
pub const DEBUG_STAGE_ENV: &str = "SCROLLSTAGE_DEBUG_STAGE";

/// Options for every component of a [`ReaderSession`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOpts {
    /// Scroll bridge options.
    pub bridge: BridgeOpts,
    /// Stage index options.
    pub stage: StageOpts,
    /// Motion renderer options.
    pub renderer: RendererOpts,
    /// Initial host viewport.
    pub viewport: Viewport,
}

impl SessionOpts {
    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> StageResult<Self> {
        serde_json::from_str(s).map_err(|e| StageError::serde(format!("session opts: {e}")))
    }

    /// Read options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> StageResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            StageError::validation(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Return options with a different viewport.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Apply overrides from the process environment (see [`DEBUG_STAGE_ENV`]).
    pub fn from_env_overrides(self) -> Self {
        let value = std::env::var(DEBUG_STAGE_ENV).ok();
        self.with_debug_stage_override(value.as_deref())
    }

    pub(crate) fn with_debug_stage_override(mut self, value: Option<&str>) -> Self {
        let Some(value) = value else {
            return self;
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => self.renderer.show_stage_markers = true,
            "0" | "false" | "off" | "no" | "" => self.renderer.show_stage_markers = false,
            other => {
                tracing::warn!(var = DEBUG_STAGE_ENV, value = other, "ignoring unrecognized value");
            }
        }
        self
    }
}

/// Point-in-time view of a session for status displays.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// Scroll bridge lifecycle state.
    pub bridge: BridgeState,
    /// Bridge counters for the current document.
    pub bridge_stats: BridgeStats,
    /// Scroll fraction used by the last tick, in percent.
    pub scroll_fraction: f64,
    /// Active waypoint, if any.
    pub active_waypoint: Option<String>,
    /// Renderer state.
    pub renderer: RendererState,
    /// Free stage samples available for snapping.
    pub free_samples: usize,
    /// How the stage samples were produced.
    pub stage_source: StageSource,
    /// Documents loaded so far.
    pub documents: u64,
}

/// One reader: bridge, stage index, orchestrator and renderer wired together.
///
/// All state lives in this instance; two sessions never share trails, injection markers or
/// scroll state. The caller owns the frame clock and calls [`ReaderSession::tick`] once per frame.
/// Scroll reports reach the session through the transport; they are picked up on the next tick.
pub struct ReaderSession {
    bridge: ScrollBridge,
    stage: StageSpaceIndex,
    orchestrator: WaypointOrchestrator,
    renderer: MotionRenderer,
    probe: Box<dyn ContentProbe>,
    viewport: Viewport,
    incoming: Rc<Cell<Option<ScrollReport>>>,
    scroll_fraction: f64,
    scroll_offset_px: Option<f64>,
    active: Liveness,
    documents: u64,
}

impl std::fmt::Debug for ReaderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderSession")
            .field("bridge", &self.bridge)
            .field("orchestrator", &self.orchestrator)
            .field("renderer", &self.renderer.state())
            .field("viewport", &self.viewport)
            .field("scroll_fraction", &self.scroll_fraction)
            .finish_non_exhaustive()
    }
}

impl ReaderSession {
    /// Session with no document, rendering nothing until one is loaded.
    pub fn new(opts: SessionOpts, transport: Rc<dyn Transport>, clock: Rc<dyn Clock>) -> Self {
        let viewport = opts.viewport;
        Self {
            bridge: ScrollBridge::new(opts.bridge, transport, clock),
            stage: StageSpaceIndex::new(opts.stage),
            orchestrator: WaypointOrchestrator::default(),
            renderer: MotionRenderer::new(opts.renderer, viewport),
            probe: Box::new(Uninspectable),
            viewport,
            incoming: Rc::new(Cell::new(None)),
            scroll_fraction: 0.0,
            scroll_offset_px: None,
            active: Liveness::new(),
            documents: 0,
        }
    }

    /// Switch to a newly loaded document and its waypoints.
    ///
    /// Re-attaches the bridge (the previous listener and reporter go quiet), replaces the
    /// waypoints, drops trails and stage samples, and schedules a stage rebuild against `probe`.
    /// The last known scroll fraction is kept until the new document reports, so a document that
    /// refuses instrumentation ([`BridgeState::Degraded`]) keeps animating where the reader was.
    #[tracing::instrument(skip_all, fields(load_id = doc.load_id(), waypoints = waypoints.len()))]
    pub fn load_document(
        &mut self,
        doc: &mut dyn EmbeddedDocument,
        probe: Box<dyn ContentProbe>,
        waypoints: WaypointBatch,
        now_ms: f64,
    ) -> BridgeState {
        self.documents += 1;
        self.incoming.set(None);
        self.scroll_offset_px = None;
        self.orchestrator.replace_batch(waypoints);
        self.renderer.reset();
        self.probe = probe;
        self.stage.clear();
        self.stage.request_rebuild(now_ms);

        let incoming = self.incoming.clone();
        let state = self.bridge.attach(
            doc,
            Some(Box::new(move |report: ScrollReport| incoming.set(Some(report)))),
            self.active.clone(),
        );
        tracing::debug!(?state, "document loaded");
        state
    }

    /// Host viewport changed. The stage rebuild is debounced.
    pub fn resize(&mut self, width: f64, height: f64, now_ms: f64) -> StageResult<()> {
        let viewport = Viewport::new(width, height)?;
        if viewport == self.viewport {
            return Ok(());
        }
        self.viewport = viewport;
        self.renderer.set_viewport(viewport);
        self.stage.request_rebuild(now_ms);
        Ok(())
    }

    /// Layout of the document changed (content reflow, late images). The rebuild is debounced.
    pub fn content_changed(&mut self, now_ms: f64) {
        self.stage.request_rebuild(now_ms);
    }

    /// Advance one frame.
    ///
    /// Uses the newest delivered scroll report or, without one, the last known fraction
    /// (0 before any report). In degraded mode that keeps the scene of the last fraction running.
    /// A report with a new scroll offset moves content under the overlay, so it schedules a
    /// debounced stage rebuild.
    pub fn tick(&mut self, now_ms: f64) -> FramePlan {
        if let Some(report) = self.incoming.take() {
            self.scroll_fraction = report.scroll_fraction;
            if self.scroll_offset_px != Some(report.scroll_offset_px) {
                self.scroll_offset_px = Some(report.scroll_offset_px);
                self.stage.request_rebuild(now_ms);
            }
        }
        self.orchestrator.update(self.scroll_fraction);
        self.stage
            .rebuild_if_due(now_ms, self.viewport, self.probe.as_ref());
        self.renderer
            .tick(now_ms, &self.orchestrator, Some(&self.stage))
    }

    /// [`ReaderSession::tick`] and rasterize the plan with `backend`.
    pub fn render(&mut self, now_ms: f64, backend: &mut dyn RasterBackend) -> StageResult<FrameRGBA> {
        let plan = self.tick(now_ms);
        backend.render_plan(&plan)
    }

    /// Subscribe to active-waypoint changes.
    pub fn on_scene_change(&mut self, handler: ChangeHandler) {
        self.orchestrator.on_change(handler);
    }

    /// Toggle the stage-marker debug layer.
    pub fn set_show_stage_markers(&mut self, show: bool) {
        self.renderer.set_show_stage_markers(show);
    }

    /// Snapshot for status displays.
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            bridge: self.bridge.state(),
            bridge_stats: self.bridge.stats(),
            scroll_fraction: self.scroll_fraction,
            active_waypoint: self.orchestrator.active_id().map(str::to_owned),
            renderer: self.renderer.state(),
            free_samples: self.stage.free_samples().len(),
            stage_source: self.stage.source(),
            documents: self.documents,
        }
    }

    /// Host viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Waypoint orchestrator (read-only).
    pub fn orchestrator(&self) -> &WaypointOrchestrator {
        &self.orchestrator
    }

    /// Stage index (read-only).
    pub fn stage(&self) -> &StageSpaceIndex {
        &self.stage
    }

    /// Motion renderer (read-only).
    pub fn renderer(&self) -> &MotionRenderer {
        &self.renderer
    }
}

impl Drop for ReaderSession {
    fn drop(&mut self) {
        self.active.kill();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/reader.rs"]
mod tests;

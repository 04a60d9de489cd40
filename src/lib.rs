//! Scrollstage is a scroll-synchronized motion overlay engine.
//!
//! A reader scrolls an embedded document; scene metadata bound to scroll windows decides what
//! plays; entities glide along smooth paths that avoid the document's content. The public API is
//! session-oriented:
//!
//! - Parse a [`WaypointBatch`]
//! - Create a [`ReaderSession`] over a [`Transport`] and a [`Clock`]
//! - [`ReaderSession::load_document`] for each document load
//! - Call [`ReaderSession::tick`] (or [`ReaderSession::render`]) once per frame
//!
//! Every component can also be used on its own; the session only wires them together.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Easing curves.
pub mod animation;
/// Scroll synchronization across the document boundary.
pub mod bridge;
/// Active-scene resolution.
pub mod orchestrate;
/// Motion path planning.
pub mod path;
/// Frame planning and rasterization.
pub mod render;
/// Scene and waypoint data.
pub mod scene;
/// Composition root.
pub mod session;
/// Content-avoiding placement samples.
pub mod stage;

pub use animation::ease::Ease;
pub use bridge::clock::{Clock, ManualClock, SystemClock};
pub use bridge::reporter::{EmbeddedDocument, Liveness, ScrollMetrics, ScrollReporter};
pub use bridge::scroll_bridge::{BridgeOpts, BridgeState, BridgeStats, ScrollBridge};
pub use bridge::transport::{Envelope, InProcessTransport, ScrollReport, Transport};
pub use foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Size, Vec2, Viewport};
pub use foundation::error::{StageError, StageResult};
pub use orchestrate::waypoints::{SceneChange, WaypointOrchestrator};
pub use path::planner::{PathPlanner, PathState};
pub use render::backend::{FrameRGBA, RasterBackend};
pub use render::cpu::{CpuRaster, CpuRasterOpts};
pub use render::motion::{MotionRenderer, RendererOpts, RendererState};
pub use render::plan::{DrawOp, FramePlan};
pub use scene::batch::WaypointBatch;
pub use scene::waypoint::{Action, ActionBeat, LayoutHint, Mood, Scene, Waypoint};
pub use session::reader::{ReaderSession, SessionOpts, SessionStatus};
pub use stage::index::{
    ContentBox, ContentProbe, FallbackPolicy, StageOpts, StageSample, StageSource,
    StageSpaceIndex, Uninspectable,
};

use crate::foundation::core::{Point, Rgba8, Vec2, Viewport};
use crate::foundation::math::{Fnv1a64, Rng64, clamp01, finite_or};
use crate::orchestrate::waypoints::WaypointOrchestrator;
use crate::path::planner::PathPlanner;
use crate::render::plan::{DrawOp, FramePlan};
use crate::render::trail::{TrailBuffer, TrailStore};
use crate::scene::waypoint::{Action, ActionBeat, Scene};
use crate::stage::index::StageSpaceIndex;

const PREVIEW_OPACITY: f64 = 0.25;
const PREVIEW_WIDTH_PX: f64 = 1.5;
const PREVIEW_DASH_PX: [f64; 2] = [6.0, 6.0];
const MARKER_RADIUS_PX: f64 = 2.0;
const MARKER_COLOR: Rgba8 = Rgba8::rgb(120, 220, 160);
const LABEL_COLOR: Rgba8 = Rgba8::rgb(240, 240, 240);

/// Motion renderer configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RendererOpts {
    /// Positions kept per entity trail.
    pub trail_len: usize,
    /// Samples in the dashed path preview.
    pub preview_resolution: usize,
    /// Paint stage-free samples as a debug layer.
    pub show_stage_markers: bool,
    /// Intensity below which entities do not jitter.
    pub jitter_floor: f64,
    /// Jitter amplitude at intensity 1.
    pub jitter_px: f64,
    /// Lateral distance between entities sharing a path.
    pub separation_px: f64,
    /// Base glyph radius.
    pub glyph_radius_px: f64,
    /// Label font size.
    pub label_size_px: f64,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            trail_len: 24,
            preview_resolution: 64,
            show_stage_markers: false,
            jitter_floor: 0.3,
            jitter_px: 6.0,
            separation_px: 18.0,
            glyph_radius_px: 10.0,
            label_size_px: 13.0,
        }
    }
}

impl RendererOpts {
    /// Return options with the stage-marker debug layer toggled.
    pub fn with_show_stage_markers(mut self, show: bool) -> Self {
        self.show_stage_markers = show;
        self
    }

    /// Return options with a different trail length.
    pub fn with_trail_len(mut self, trail_len: usize) -> Self {
        self.trail_len = trail_len;
        self
    }

    /// Return options with a different jitter amplitude.
    pub fn with_jitter_px(mut self, jitter_px: f64) -> Self {
        self.jitter_px = jitter_px;
        self
    }
}

/// Whether the renderer currently has a scene to animate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererState {
    /// No active scene; ticks produce empty plans.
    #[default]
    Idle,
    /// Looping the active scene.
    Animating,
}

/// Per-frame driver turning the active scene into a [`FramePlan`].
///
/// The frame loop is owned by the caller: call [`MotionRenderer::tick`] once per frame with a
/// monotonic timestamp. Trails are owned by this instance and reset whenever the active waypoint
/// changes.
#[derive(Debug)]
pub struct MotionRenderer {
    opts: RendererOpts,
    planner: PathPlanner,
    trails: TrailStore,
    state: RendererState,
    scene_key: Option<String>,
    scene_started_ms: f64,
    progress: f64,
    frames: u64,
}

impl MotionRenderer {
    /// Idle renderer for `viewport`.
    pub fn new(opts: RendererOpts, viewport: Viewport) -> Self {
        let trails = TrailStore::new(opts.trail_len);
        Self {
            opts,
            planner: PathPlanner::new(viewport),
            trails,
            state: RendererState::Idle,
            scene_key: None,
            scene_started_ms: 0.0,
            progress: 0.0,
            frames: 0,
        }
    }

    /// Current options.
    pub fn opts(&self) -> &RendererOpts {
        &self.opts
    }

    /// Toggle the stage-marker debug layer.
    pub fn set_show_stage_markers(&mut self, show: bool) {
        self.opts.show_stage_markers = show;
    }

    /// Idle or animating.
    pub fn state(&self) -> RendererState {
        self.state
    }

    /// Output viewport.
    pub fn viewport(&self) -> Viewport {
        self.planner.viewport()
    }

    /// Change the output size. Trails are in pixels, so they are dropped.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.planner.viewport() {
            self.planner.set_viewport(viewport);
            self.trails.reset();
        }
    }

    /// Looped scene progress computed by the last tick, in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Ticks since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Trail for `entity_id`, if it has been drawn since the last reset.
    pub fn trail(&self, entity_id: &str) -> Option<&TrailBuffer> {
        self.trails.get(entity_id)
    }

    /// Drop all trails and return to `Idle` (document change).
    pub fn reset(&mut self) {
        self.trails.reset();
        self.scene_key = None;
        self.progress = 0.0;
        self.state = RendererState::Idle;
    }

    /// Advance to `now_ms` and build the frame for the orchestrator's active scene.
    ///
    /// Ops are emitted in paint order: path preview, stage markers (debug layer), then per
    /// entity its trail, glyph and label.
    pub fn tick(
        &mut self,
        now_ms: f64,
        orchestrator: &WaypointOrchestrator,
        stage: Option<&StageSpaceIndex>,
    ) -> FramePlan {
        let (w, h) = self.planner.viewport().pixel_size();
        let mut plan = FramePlan::new(w, h);
        self.frames = self.frames.wrapping_add(1);
        let now_ms = finite_or(now_ms, self.scene_started_ms);

        let Some(waypoint) = orchestrator.active() else {
            if self.state == RendererState::Animating {
                tracing::debug!("no active scene, renderer idle");
                self.reset();
            }
            return plan;
        };

        if self.scene_key.as_deref() != Some(waypoint.id.as_str()) {
            tracing::debug!(
                waypoint = %waypoint.id,
                mood = waypoint.scene.mood.name(),
                entities = waypoint.scene.action_beats.len(),
                "scene started"
            );
            for beat in &waypoint.scene.action_beats {
                tracing::trace!(
                    entity = %beat.entity_id,
                    action = beat.action.name(),
                    mood = beat.mood.name(),
                    "entity cast"
                );
            }
            self.trails.reset();
            self.scene_key = Some(waypoint.id.clone());
            self.scene_started_ms = now_ms;
            self.state = RendererState::Animating;
        }

        let scene = &waypoint.scene;
        let elapsed = (now_ms - self.scene_started_ms).max(0.0);
        self.progress = (elapsed % scene.duration_ms) / scene.duration_ms;

        self.push_preview(&mut plan, scene, stage);
        if self.opts.show_stage_markers
            && let Some(stage) = stage
        {
            for p in stage.free_samples() {
                plan.push(DrawOp::Marker {
                    center: *p,
                    radius: MARKER_RADIUS_PX,
                    color: MARKER_COLOR.with_opacity(PREVIEW_OPACITY),
                });
            }
        }
        for (i, beat) in scene.action_beats.iter().enumerate() {
            self.push_entity(&mut plan, scene, i, beat, stage);
        }
        plan
    }

    fn push_preview(&self, plan: &mut FramePlan, scene: &Scene, stage: Option<&StageSpaceIndex>) {
        let vp = self.planner.viewport();
        let points: Vec<Point> = self
            .planner
            .generate_path(&scene.layout_hints, self.opts.preview_resolution, stage)
            .into_iter()
            .map(|s| vp.to_px(s.point()))
            .collect();
        if points.len() < 2 {
            return;
        }
        plan.push(DrawOp::DashedPath {
            points,
            color: scene.mood.color().with_opacity(PREVIEW_OPACITY),
            width: PREVIEW_WIDTH_PX,
            dash: PREVIEW_DASH_PX,
        });
    }

    fn push_entity(
        &mut self,
        plan: &mut FramePlan,
        scene: &Scene,
        index: usize,
        beat: &ActionBeat,
        stage: Option<&StageSpaceIndex>,
    ) {
        let local = match beat.action {
            Action::Idle => 0.0,
            action => (self.progress * action.rate()).fract(),
        };
        let eased = scene.easing.apply(local);
        let state = self.planner.point_at(&scene.layout_hints, eased, stage);

        let normal = Vec2::new(-state.heading.sin(), state.heading.cos());
        let mut pos = self.planner.viewport().to_px(state.point())
            + normal * (lateral_slot(index) * self.opts.separation_px)
            + self.jitter(&beat.entity_id, scene.intensity);
        pos.y += beat.action.vertical_offset_px(self.progress) * (0.5 + scene.intensity);
        if !pos.x.is_finite() || !pos.y.is_finite() {
            return;
        }

        let color = beat.mood.color();
        let grow = clamp01(eased);
        let radius = self.opts.glyph_radius_px * (0.75 + 0.5 * scene.intensity) * (0.9 + 0.2 * grow);

        let trail = self.trails.record(&beat.entity_id, pos);
        if trail.len() > 1 {
            plan.push(DrawOp::Trail {
                points: trail.points().collect(),
                color,
                radius: radius * 0.5,
            });
        }
        plan.push(DrawOp::Glyph {
            center: pos,
            radius,
            heading: state.heading,
            color,
            glow_radius: radius * (1.5 + scene.intensity + 0.5 * grow),
            glow_opacity: 0.15 + 0.35 * scene.intensity,
        });
        plan.push(DrawOp::Label {
            origin: Point::new(pos.x + radius + 4.0, pos.y - radius - self.opts.label_size_px),
            text: beat.entity_id.clone(),
            size_px: self.opts.label_size_px,
            color: LABEL_COLOR,
        });
    }

    /// Bounded offset seeded by entity and frame, so replaying the same ticks repeats it.
    fn jitter(&self, entity_id: &str, intensity: f64) -> Vec2 {
        if intensity < self.opts.jitter_floor || self.opts.jitter_px <= 0.0 {
            return Vec2::ZERO;
        }
        let mut h = Fnv1a64::new_default();
        h.write_bytes(entity_id.as_bytes());
        h.write_u64(self.frames);
        let mut rng = Rng64::new(h.finish());
        let amp = self.opts.jitter_px * intensity;
        Vec2::new(rng.next_signed() * amp, rng.next_signed() * amp)
    }
}

/// Side and distance of entity `index` from the shared path, in separation units:
/// `0, +1, -1, +2, -2, ...`.
pub(crate) fn lateral_slot(index: usize) -> f64 {
    if index == 0 {
        0.0
    } else if index % 2 == 1 {
        index.div_ceil(2) as f64
    } else {
        -((index / 2) as f64)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/motion.rs"]
mod tests;

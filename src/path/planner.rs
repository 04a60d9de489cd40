use crate::foundation::core::{Point, Viewport};
use crate::foundation::math::{clamp01, finite_or};
use crate::scene::waypoint::LayoutHint;
use crate::stage::index::StageSpaceIndex;
use kurbo::{CubicBez, ParamCurve};

/// Progress step used for the forward finite-difference heading.
pub const HEADING_LOOK_AHEAD: f64 = 0.01;

/// Position and heading on a path.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PathState {
    /// Horizontal position, normalized `[0, 1]`.
    pub x: f64,
    /// Vertical position, normalized `[0, 1]`.
    pub y: f64,
    /// Direction of travel in radians, measured in viewport pixel space (y down).
    pub heading: f64,
}

impl PathState {
    /// The position as a normalized point.
    pub fn point(self) -> Point {
        Point::new(self.x, self.y)
    }

    fn sanitized(p: Point, heading: f64) -> Self {
        Self {
            x: clamp01(finite_or(p.x, 0.5)),
            y: clamp01(finite_or(p.y, 0.5)),
            heading: finite_or(heading, 0.0),
        }
    }
}

/// Computes smooth paths through layout hints.
///
/// Paths are uniform Catmull-Rom splines, evaluated segment by segment as the equivalent cubic
/// Béziers. End segments duplicate the first/last hint as virtual control points, so the path
/// never extrapolates past its ends.
///
/// Heading is a forward finite difference on the *raw* spline, even when positions are snapped
/// to the stage index. Snapped positions move in grid-sized jumps and would make the heading
/// flicker or collapse to zero between samples.
#[derive(Clone, Copy, Debug)]
pub struct PathPlanner {
    viewport: Viewport,
}

impl PathPlanner {
    /// Planner for a viewport (used for pixel-space headings and snapping).
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// Viewport used for heading and snapping.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Change the viewport after a resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Position and heading at progress `t` in `[0, 1]`.
    ///
    /// - no usable hints: viewport center, heading 0
    /// - one hint: that hint, heading 0
    /// - otherwise: the spline point
    ///
    /// In every case the point is snapped to the nearest free stage sample when `stage` is given
    /// and built, so `point_at(&[p], t, None)` is exactly `p` but a staged point may move.
    pub fn point_at(
        &self,
        hints: &[LayoutHint],
        t: f64,
        stage: Option<&StageSpaceIndex>,
    ) -> PathState {
        let pts = control_points(hints);
        let t = clamp01(finite_or(t, 0.0));
        match pts.len() {
            0 => PathState::sanitized(snap_norm(stage, Point::new(0.5, 0.5)), 0.0),
            1 => PathState::sanitized(snap_norm(stage, pts[0]), 0.0),
            _ => {
                let raw = spline_point(&pts, t);
                let heading = self.heading(&pts, t);
                PathState::sanitized(snap_norm(stage, raw), heading)
            }
        }
    }

    /// `resolution` evenly spaced states from `t = 0` to `t = 1` inclusive.
    pub fn generate_path(
        &self,
        hints: &[LayoutHint],
        resolution: usize,
        stage: Option<&StageSpaceIndex>,
    ) -> Vec<PathState> {
        match resolution {
            0 => Vec::new(),
            1 => vec![self.point_at(hints, 0.0, stage)],
            n => {
                let last = (n - 1) as f64;
                (0..n)
                    .map(|i| self.point_at(hints, i as f64 / last, stage))
                    .collect()
            }
        }
    }

    fn heading(&self, pts: &[Point], t: f64) -> f64 {
        let (a, b) = if t + HEADING_LOOK_AHEAD <= 1.0 {
            (
                spline_point(pts, t),
                spline_point(pts, t + HEADING_LOOK_AHEAD),
            )
        } else {
            // At the end, look back so the final heading keeps the direction of arrival.
            (
                spline_point(pts, (t - HEADING_LOOK_AHEAD).max(0.0)),
                spline_point(pts, t),
            )
        };
        let dx = (b.x - a.x) * self.viewport.width.max(1.0);
        let dy = (b.y - a.y) * self.viewport.height.max(1.0);
        if dx.hypot(dy) < 1e-9 {
            return 0.0;
        }
        dy.atan2(dx)
    }
}

fn control_points(hints: &[LayoutHint]) -> Vec<Point> {
    hints.iter().filter_map(LayoutHint::point).collect()
}

fn spline_point(pts: &[Point], t: f64) -> Point {
    let n = pts.len();
    debug_assert!(n >= 2);
    let span = t * (n - 1) as f64;
    let seg = (span.floor() as usize).min(n - 2);
    let local = (span - seg as f64).clamp(0.0, 1.0);
    segment(pts, seg).eval(local)
}

/// Cubic Bézier equivalent of Catmull-Rom segment `i` (from `pts[i]` to `pts[i + 1]`).
fn segment(pts: &[Point], i: usize) -> CubicBez {
    let last = pts.len() - 1;
    let p0 = pts[i.saturating_sub(1)];
    let p1 = pts[i];
    let p2 = pts[(i + 1).min(last)];
    let p3 = pts[(i + 2).min(last)];
    CubicBez::new(p1, p1 + (p2 - p0) / 6.0, p2 - (p3 - p1) / 6.0, p2)
}

fn snap_norm(stage: Option<&StageSpaceIndex>, p: Point) -> Point {
    let Some(stage) = stage else {
        return p;
    };
    let vp = stage.viewport();
    if vp.is_empty() || stage.free_samples().is_empty() {
        return p;
    }
    vp.to_norm(stage.snap(vp.to_px(p)))
}

#[cfg(test)]
#[path = "../../tests/unit/path/planner.rs"]
mod tests;

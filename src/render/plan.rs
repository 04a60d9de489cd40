use crate::foundation::core::{Point, Rgba8};

/// One drawing instruction in viewport pixel space.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    /// Stroked dashed polyline (path preview).
    DashedPath {
        /// Polyline vertices.
        points: Vec<Point>,
        /// Stroke color.
        color: Rgba8,
        /// Stroke width.
        width: f64,
        /// Dash and gap lengths.
        dash: [f64; 2],
    },
    /// Small filled dot (stage-free sample).
    Marker {
        /// Dot center.
        center: Point,
        /// Dot radius.
        radius: f64,
        /// Fill color.
        color: Rgba8,
    },
    /// Fading dots along recent positions, oldest first.
    Trail {
        /// Recent positions, oldest first.
        points: Vec<Point>,
        /// Color of the newest dot; older dots fade towards transparent.
        color: Rgba8,
        /// Radius of the newest dot.
        radius: f64,
    },
    /// Entity body with a soft glow and a heading notch.
    Glyph {
        /// Body center.
        center: Point,
        /// Body radius.
        radius: f64,
        /// Direction of travel in radians.
        heading: f64,
        /// Body color.
        color: Rgba8,
        /// Glow radius (`>= radius`).
        glow_radius: f64,
        /// Glow opacity in `[0, 1]`.
        glow_opacity: f64,
    },
    /// Text label with its baseline-left origin.
    Label {
        /// Top-left origin of the laid out text.
        origin: Point,
        /// Label text.
        text: String,
        /// Font size in pixels.
        size_px: f64,
        /// Text color.
        color: Rgba8,
    },
}

impl DrawOp {
    /// Return `true` when every coordinate and size in the op is finite.
    pub fn is_finite(&self) -> bool {
        let pt = |p: &Point| p.x.is_finite() && p.y.is_finite();
        match self {
            Self::DashedPath {
                points,
                width,
                dash,
                ..
            } => points.iter().all(pt) && width.is_finite() && dash.iter().all(|d| d.is_finite()),
            Self::Marker { center, radius, .. } => pt(center) && radius.is_finite(),
            Self::Trail { points, radius, .. } => points.iter().all(pt) && radius.is_finite(),
            Self::Glyph {
                center,
                radius,
                heading,
                glow_radius,
                glow_opacity,
                ..
            } => {
                pt(center)
                    && radius.is_finite()
                    && heading.is_finite()
                    && glow_radius.is_finite()
                    && glow_opacity.is_finite()
            }
            Self::Label {
                origin, size_px, ..
            } => pt(origin) && size_px.is_finite(),
        }
    }

    /// Short op name, used in logs and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DashedPath { .. } => "dashed-path",
            Self::Marker { .. } => "marker",
            Self::Trail { .. } => "trail",
            Self::Glyph { .. } => "glyph",
            Self::Label { .. } => "label",
        }
    }
}

/// Draw list for one frame. Ops are painted in order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FramePlan {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Ops in paint order.
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    /// Empty plan for a `width` x `height` surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Append an op, dropping it when it carries non-finite geometry.
    pub fn push(&mut self, op: DrawOp) {
        if op.is_finite() {
            self.ops.push(op);
        } else {
            tracing::trace!(kind = op.kind(), "dropping non-finite draw op");
        }
    }

    /// Return `true` when there is nothing to paint.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of ops of the given [`DrawOp::kind`].
    pub fn count(&self, kind: &str) -> usize {
        self.ops.iter().filter(|op| op.kind() == kind).count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;

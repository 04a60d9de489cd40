use crate::foundation::error::{StageError, StageResult};
use crate::foundation::math::{clamp01, finite_or};

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Host viewport dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    /// Create a validated viewport with finite, non-negative dimensions.
    pub fn new(width: f64, height: f64) -> StageResult<Self> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(StageError::validation(
                "viewport dimensions must be finite and >= 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Return `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Map a normalized `[0, 1]` point into pixel space.
    pub fn to_px(self, norm: Point) -> Point {
        Point::new(norm.x * self.width, norm.y * self.height)
    }

    /// Map a pixel point back into normalized space.
    ///
    /// Degenerate viewports map everything to the center.
    pub fn to_norm(self, px: Point) -> Point {
        if self.is_empty() {
            return Point::new(0.5, 0.5);
        }
        Point::new(
            clamp01(finite_or(px.x / self.width, 0.5)),
            clamp01(finite_or(px.y / self.height, 0.5)),
        )
    }

    /// Surface dimensions rounded to whole pixels.
    pub fn pixel_size(self) -> (u32, u32) {
        (
            self.width.max(0.0).round() as u32,
            self.height.max(0.0).round() as u32,
        )
    }
}

/// Straight-alpha RGBA8 color used by draw ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Replace alpha with `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (clamp01(finite_or(opacity, 0.0)) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// Convert to premultiplied RGBA8 bytes.
    pub fn to_premul(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

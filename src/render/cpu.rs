use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{StageError, StageResult};
use crate::render::backend::{FrameRGBA, RasterBackend};
use crate::render::plan::{DrawOp, FramePlan};
use crate::render::text::{LabelBrush, LabelLayout};
use kurbo::Shape;
use std::sync::Arc;

/// Options for [`CpuRaster`].
#[derive(Clone, Debug, Default)]
pub struct CpuRasterOpts {
    /// If set, the surface is cleared to this straight-alpha RGBA8 color before drawing.
    pub clear_rgba: Option<[u8; 4]>,
    /// Font used for label ops. Without one, labels are skipped.
    pub font_bytes: Option<Arc<Vec<u8>>>,
}

impl CpuRasterOpts {
    /// Return options with a configured clear color.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }

    /// Return options with a label font (TTF/OTF bytes).
    pub fn with_font_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.font_bytes = Some(Arc::new(bytes));
        self
    }
}

/// CPU raster backend powered by `vello_cpu`.
///
/// The render context is kept between frames and recreated only when the surface size changes.
pub struct CpuRaster {
    clear_rgba: Option<[u8; 4]>,
    ctx: Option<vello_cpu::RenderContext>,
    labels: Option<LabelLayout>,
    skipped_labels: u64,
}

impl std::fmt::Debug for CpuRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRaster")
            .field("clear_rgba", &self.clear_rgba)
            .field("labels", &self.labels)
            .field("skipped_labels", &self.skipped_labels)
            .finish_non_exhaustive()
    }
}

impl CpuRaster {
    /// Create a backend. Fails only when `font_bytes` is set and holds no usable font.
    pub fn new(opts: CpuRasterOpts) -> StageResult<Self> {
        let labels = opts
            .font_bytes
            .as_deref()
            .map(|bytes| LabelLayout::new(bytes))
            .transpose()?;
        Ok(Self {
            clear_rgba: opts.clear_rgba,
            ctx: None,
            labels,
            skipped_labels: 0,
        })
    }

    /// Return `true` when label ops will be painted.
    pub fn has_font(&self) -> bool {
        self.labels.is_some()
    }

    /// Label ops skipped so far because no font was configured or shaping failed.
    pub fn skipped_labels(&self) -> u64 {
        self.skipped_labels
    }

    fn draw_op(&mut self, ctx: &mut vello_cpu::RenderContext, op: &DrawOp) {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match op {
            DrawOp::DashedPath {
                points,
                color,
                width,
                dash,
            } => {
                let Some((first, rest)) = points.split_first() else {
                    return;
                };
                if rest.is_empty() || *width <= 0.0 {
                    return;
                }
                let mut path = vello_cpu::kurbo::BezPath::new();
                path.move_to(cpu_point(*first));
                for p in rest {
                    path.line_to(cpu_point(*p));
                }
                let stroke = if dash.iter().all(|d| *d > 0.0) {
                    vello_cpu::kurbo::Stroke::new(*width).with_dashes(0.0, *dash)
                } else {
                    vello_cpu::kurbo::Stroke::new(*width)
                };
                ctx.set_stroke(stroke);
                ctx.set_paint(cpu_color(*color));
                ctx.stroke_path(&path);
            }
            DrawOp::Marker {
                center,
                radius,
                color,
            } => fill_circle(ctx, *center, *radius, *color),
            DrawOp::Trail {
                points,
                color,
                radius,
            } => {
                let n = points.len() as f64;
                let base_alpha = f64::from(color.a) / 255.0;
                for (i, p) in points.iter().enumerate() {
                    // Oldest dot first, fading in towards the newest.
                    let frac = (i as f64 + 1.0) / n;
                    let c = color.with_opacity(base_alpha * frac * 0.6);
                    fill_circle(ctx, *p, radius * (0.35 + 0.65 * frac), c);
                }
            }
            DrawOp::Glyph {
                center,
                radius,
                heading,
                color,
                glow_radius,
                glow_opacity,
            } => {
                if *glow_radius > *radius && *glow_opacity > 0.0 {
                    fill_circle(ctx, *center, *glow_radius, color.with_opacity(*glow_opacity));
                }
                fill_circle(ctx, *center, *radius, *color);

                let dir = kurbo::Vec2::from_angle(*heading);
                let perp = kurbo::Vec2::new(-dir.y, dir.x);
                let tip = *center + dir * (radius * 1.6);
                let base = *center + dir * (radius * 0.8);
                let mut notch = vello_cpu::kurbo::BezPath::new();
                notch.move_to(cpu_point(tip));
                notch.line_to(cpu_point(base + perp * (radius * 0.45)));
                notch.line_to(cpu_point(base - perp * (radius * 0.45)));
                notch.close_path();
                ctx.set_paint(cpu_color(*color));
                ctx.fill_path(&notch);
            }
            DrawOp::Label {
                origin,
                text,
                size_px,
                color,
            } => self.draw_label(ctx, *origin, text, *size_px, *color),
        }
    }

    fn draw_label(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        origin: Point,
        text: &str,
        size_px: f64,
        color: Rgba8,
    ) {
        let Some(labels) = self.labels.as_mut() else {
            if self.skipped_labels == 0 {
                tracing::debug!("no label font configured, skipping label ops");
            }
            self.skipped_labels += 1;
            return;
        };
        let layout = match labels.layout(text, size_px as f32, LabelBrush::from(color)) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::debug!(error = %e, "label layout failed");
                self.skipped_labels += 1;
                return;
            }
        };

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(labels.font())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

impl RasterBackend for CpuRaster {
    fn render_plan(&mut self, plan: &FramePlan) -> StageResult<FrameRGBA> {
        if plan.width == 0 || plan.height == 0 {
            return Ok(FrameRGBA::transparent(plan.width, plan.height));
        }
        let width = u16::try_from(plan.width)
            .map_err(|_| StageError::render(format!("surface width {} exceeds u16", plan.width)))?;
        let height = u16::try_from(plan.height).map_err(|_| {
            StageError::render(format!("surface height {} exceeds u16", plan.height))
        })?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();

        if let Some([r, g, b, a]) = self.clear_rgba {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        for op in &plan.ops {
            if op.is_finite() {
                self.draw_op(&mut ctx, op);
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        let data = pixmap.data_as_u8_slice().to_vec();
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: plan.width,
            height: plan.height,
            data,
            premultiplied: true,
        })
    }
}

fn cpu_point(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn fill_circle(ctx: &mut vello_cpu::RenderContext, center: Point, radius: f64, color: Rgba8) {
    if radius <= 0.0 || color.a == 0 {
        return;
    }
    let circle = kurbo::Circle::new(center, radius);
    let mut path = vello_cpu::kurbo::BezPath::new();
    for el in circle.path_elements(0.1) {
        path.push(el);
    }
    ctx.set_paint(cpu_color(color));
    ctx.fill_path(&path);
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

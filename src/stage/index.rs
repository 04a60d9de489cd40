use crate::foundation::core::{Point, Rect, Viewport};
use crate::foundation::error::{StageError, StageResult};

/// Bounding box of one rendered element, in host viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentBox {
    /// Element bounds.
    pub rect: Rect,
    /// Whether the element is currently displayed.
    pub visible: bool,
    /// Element contains text.
    pub has_text: bool,
    /// Element contains an image.
    pub has_image: bool,
}

impl ContentBox {
    /// Visible text-bearing element.
    pub fn text(rect: Rect) -> Self {
        Self {
            rect,
            visible: true,
            has_text: true,
            has_image: false,
        }
    }

    /// Visible image element.
    pub fn image(rect: Rect) -> Self {
        Self {
            rect,
            visible: true,
            has_text: false,
            has_image: true,
        }
    }

    fn occupies_space(&self) -> bool {
        let r = self.rect;
        self.visible
            && (self.has_text || self.has_image)
            && [r.x0, r.y0, r.x1, r.y1].iter().all(|v| v.is_finite())
            && r.width() > 0.0
            && r.height() > 0.0
    }
}

/// Source of content geometry for the displayed document.
pub trait ContentProbe {
    /// Bounding boxes of the document's elements, in host viewport pixels.
    ///
    /// Returns [`crate::StageError::Access`] when the document cannot be inspected.
    fn content_boxes(&self) -> StageResult<Vec<ContentBox>>;
}

impl ContentProbe for Vec<ContentBox> {
    fn content_boxes(&self) -> StageResult<Vec<ContentBox>> {
        Ok(self.clone())
    }
}

/// Probe for a document whose content cannot be inspected (cross-origin).
#[derive(Clone, Copy, Debug, Default)]
pub struct Uninspectable;

impl ContentProbe for Uninspectable {
    fn content_boxes(&self) -> StageResult<Vec<ContentBox>> {
        Err(StageError::access("document content is not inspectable"))
    }
}

/// What to do when content cannot be inspected.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FallbackPolicy {
    /// Treat every sample as free.
    AllFree,
    /// Only the band within `margin_px` of the viewport edges is free.
    ViewportMargins {
        /// Width of the free band.
        #[serde(rename = "marginPx")]
        margin_px: f64,
    },
}

/// Stage index configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageOpts {
    /// Distance between grid samples.
    pub grid_step_px: f64,
    /// Padding added around each content box before intersection tests.
    pub padding_px: f64,
    /// Quiet period after the last rebuild request before rebuilding.
    pub debounce_ms: f64,
    /// Policy for documents that cannot be inspected.
    pub fallback: FallbackPolicy,
}

impl Default for StageOpts {
    fn default() -> Self {
        Self {
            grid_step_px: 45.0,
            padding_px: 12.0,
            debounce_ms: 150.0,
            fallback: FallbackPolicy::AllFree,
        }
    }
}

/// One grid sample in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageSample {
    /// Sample center.
    pub pos: Point,
    /// `true` when the sample's cell touches no content.
    pub free: bool,
}

/// How the current sample set was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageSource {
    /// Never built, or cleared.
    Empty,
    /// Built from inspected content.
    Inspected,
    /// Built from the fallback policy.
    Fallback,
}

/// Free/occupied classification of the viewport on a fixed grid.
///
/// The sample set is rebuilt wholesale, never patched. Rebuild cost is samples x elements, so
/// callers go through [`StageSpaceIndex::request_rebuild`] and
/// [`StageSpaceIndex::rebuild_if_due`] rather than rebuilding every frame.
#[derive(Clone, Debug)]
pub struct StageSpaceIndex {
    opts: StageOpts,
    viewport: Viewport,
    samples: Vec<StageSample>,
    free: Vec<Point>,
    source: StageSource,
    requested_at: Option<f64>,
    builds: u64,
}

impl StageSpaceIndex {
    /// Empty index.
    pub fn new(opts: StageOpts) -> Self {
        Self {
            opts,
            viewport: Viewport {
                width: 0.0,
                height: 0.0,
            },
            samples: Vec::new(),
            free: Vec::new(),
            source: StageSource::Empty,
            requested_at: None,
            builds: 0,
        }
    }

    /// Options in effect.
    pub fn opts(&self) -> &StageOpts {
        &self.opts
    }

    /// All samples from the last rebuild.
    pub fn samples(&self) -> &[StageSample] {
        &self.samples
    }

    /// Centers of the free samples.
    pub fn free_samples(&self) -> &[Point] {
        &self.free
    }

    /// Viewport of the last rebuild.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Provenance of the current sample set.
    pub fn source(&self) -> StageSource {
        self.source
    }

    /// Number of completed rebuilds.
    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// Drop every sample (document or scene change).
    pub fn clear(&mut self) {
        self.samples.clear();
        self.free.clear();
        self.source = StageSource::Empty;
    }

    /// Note that layout changed at `now_ms`. Bursts extend the quiet period.
    pub fn request_rebuild(&mut self, now_ms: f64) {
        self.requested_at = Some(now_ms);
    }

    /// Whether a rebuild request is outstanding.
    pub fn is_dirty(&self) -> bool {
        self.requested_at.is_some()
    }

    /// Rebuild if a request is outstanding and has been quiet for the debounce period.
    ///
    /// The very first build is not delayed. Returns `true` when a rebuild ran.
    pub fn rebuild_if_due(
        &mut self,
        now_ms: f64,
        viewport: Viewport,
        probe: &dyn ContentProbe,
    ) -> bool {
        let Some(at) = self.requested_at else {
            return false;
        };
        if self.builds > 0 && now_ms - at < self.opts.debounce_ms {
            return false;
        }
        self.rebuild(viewport, probe);
        true
    }

    /// Rebuild the whole sample set for `viewport`.
    #[tracing::instrument(skip(self, probe), fields(w = viewport.width, h = viewport.height))]
    pub fn rebuild(&mut self, viewport: Viewport, probe: &dyn ContentProbe) -> &[StageSample] {
        self.requested_at = None;
        self.builds += 1;
        self.viewport = viewport;
        self.samples.clear();
        self.free.clear();

        let step = if self.opts.grid_step_px.is_finite() && self.opts.grid_step_px >= 1.0 {
            self.opts.grid_step_px
        } else {
            StageOpts::default().grid_step_px
        };
        let pad = if self.opts.padding_px.is_finite() {
            self.opts.padding_px.max(0.0)
        } else {
            0.0
        };

        let classify: Box<dyn Fn(Rect) -> bool> = match probe.content_boxes() {
            Ok(boxes) => {
                self.source = StageSource::Inspected;
                let occupied: Vec<Rect> = boxes
                    .iter()
                    .filter(|b| b.occupies_space())
                    .map(|b| b.rect.inflate(pad, pad))
                    .collect();
                Box::new(move |cell: Rect| !occupied.iter().any(|r| overlaps(*r, cell)))
            }
            Err(e) => {
                self.source = StageSource::Fallback;
                tracing::debug!(error = %e, policy = ?self.opts.fallback, "content not inspectable, using fallback");
                match self.opts.fallback {
                    FallbackPolicy::AllFree => Box::new(|_: Rect| true),
                    FallbackPolicy::ViewportMargins { margin_px } => {
                        let m = if margin_px.is_finite() { margin_px.max(0.0) } else { 0.0 };
                        let inner = Rect::new(m, m, viewport.width - m, viewport.height - m);
                        Box::new(move |cell: Rect| {
                            let c = cell.center();
                            !(inner.width() > 0.0 && inner.height() > 0.0 && inner.contains(c))
                        })
                    }
                }
            }
        };

        if viewport.is_empty() {
            return &self.samples;
        }

        let mut y = 0.0;
        while y < viewport.height {
            let mut x = 0.0;
            while x < viewport.width {
                let cell = Rect::new(x, y, x + step, y + step);
                let pos = cell.center();
                let free = classify(cell);
                self.samples.push(StageSample { pos, free });
                if free {
                    self.free.push(pos);
                }
                x += step;
            }
            y += step;
        }

        tracing::debug!(
            samples = self.samples.len(),
            free = self.free.len(),
            "stage index rebuilt"
        );
        &self.samples
    }

    /// Nearest free sample to `p` by squared Euclidean distance, or `p` itself when no sample is
    /// free.
    pub fn snap(&self, p: Point) -> Point {
        if !p.x.is_finite() || !p.y.is_finite() {
            return p;
        }
        let mut best: Option<(f64, Point)> = None;
        for &s in &self.free {
            let d = (s - p).hypot2();
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, s));
            }
        }
        best.map(|(_, s)| s).unwrap_or(p)
    }
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

#[cfg(test)]
#[path = "../../tests/unit/stage/index.rs"]
mod tests;

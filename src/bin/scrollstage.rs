use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use scrollstage::{
    ContentBox, CpuRaster, CpuRasterOpts, EmbeddedDocument, FrameRGBA, InProcessTransport,
    ManualClock, Rect, ReaderSession, SceneChange, ScrollMetrics, ScrollReporter, SessionOpts,
    StageResult, Viewport, WaypointBatch,
};

const CLEAR_RGBA: [u8; 4] = [18, 20, 28, 255];
/// Synthetic document height, in viewport heights.
const DOC_PAGES: f64 = 5.0;

#[derive(Parser, Debug)]
#[command(name = "scrollstage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and normalize a waypoint batch, printing the result as JSON.
    Check(CheckArgs),
    /// Render a single overlay frame as a PNG.
    Frame(FrameArgs),
    /// Scroll from 0 to 100% and render one PNG per step.
    Sweep(SweepArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Waypoint batch JSON.
    #[arg(long)]
    waypoints: PathBuf,
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Waypoint batch JSON.
    #[arg(long)]
    waypoints: PathBuf,

    /// Output width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// TTF/OTF font for entity labels. Labels are skipped without one.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Session options JSON (partial files are fine).
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Paint the stage-free samples.
    #[arg(long)]
    debug_stage: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Scroll progress in percent.
    #[arg(long)]
    scroll: f64,

    /// Time since the scene became active, in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    time_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Number of frames.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Time between frames in milliseconds.
    #[arg(long, default_value_t = 60.0)]
    frame_ms: f64,

    /// Output directory for `frame_NNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scrollstage=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Sweep(args) => cmd_sweep(args),
    }
}

/// Stand-in for a real embedded page: a centered text column with a scroll range of
/// `DOC_PAGES` viewports.
struct SyntheticDoc {
    viewport: Viewport,
    reporter: Option<ScrollReporter>,
}

impl SyntheticDoc {
    fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            reporter: None,
        }
    }

    fn scroll_to(&mut self, percent: f64) -> anyhow::Result<()> {
        let Some(reporter) = self.reporter.as_mut() else {
            return Ok(());
        };
        let viewport_height = self.viewport.height;
        let document_height = viewport_height * DOC_PAGES;
        let range = document_height - viewport_height;
        reporter.on_scroll(ScrollMetrics {
            scroll_y: percent.clamp(0.0, 100.0) / 100.0 * range,
            viewport_height,
            document_height,
        });
        reporter.on_animation_frame()?;
        Ok(())
    }

    fn content(&self) -> Vec<ContentBox> {
        let (w, h) = (self.viewport.width, self.viewport.height);
        let (x0, x1) = (w * 0.22, w * 0.78);
        let mut out = Vec::new();
        let mut y = h * 0.08;
        let mut i = 0;
        while y < h {
            let block = if i % 4 == 3 { h * 0.2 } else { h * 0.09 };
            let rect = Rect::new(x0, y, x1, (y + block).min(h));
            out.push(if i % 4 == 3 {
                ContentBox::image(rect)
            } else {
                ContentBox::text(rect)
            });
            y += block + h * 0.04;
            i += 1;
        }
        out
    }
}

impl EmbeddedDocument for SyntheticDoc {
    fn load_id(&self) -> u64 {
        1
    }

    fn install_reporter(&mut self, reporter: ScrollReporter) -> StageResult<()> {
        self.reporter = Some(reporter);
        Ok(())
    }
}

struct Driver {
    session: ReaderSession,
    transport: InProcessTransport,
    clock: ManualClock,
    doc: SyntheticDoc,
    backend: CpuRaster,
}

impl Driver {
    fn new(args: &SceneArgs) -> anyhow::Result<Self> {
        let batch = WaypointBatch::from_path(&args.waypoints)
            .with_context(|| format!("load waypoints '{}'", args.waypoints.display()))?;

        let mut opts = match &args.opts {
            Some(p) => SessionOpts::from_path(p)
                .with_context(|| format!("load session opts '{}'", p.display()))?,
            None => SessionOpts::default(),
        };
        let viewport = Viewport::new(f64::from(args.width), f64::from(args.height))?;
        opts.viewport = viewport;
        let mut opts = opts.from_env_overrides();
        if args.debug_stage {
            opts.renderer.show_stage_markers = true;
        }

        let mut raster_opts = CpuRasterOpts::default().with_clear_rgba(Some(CLEAR_RGBA));
        if let Some(p) = &args.font {
            let bytes =
                std::fs::read(p).with_context(|| format!("read font '{}'", p.display()))?;
            raster_opts = raster_opts.with_font_bytes(bytes);
        }
        let backend = CpuRaster::new(raster_opts).context("create cpu raster")?;

        let transport = InProcessTransport::new();
        let clock = ManualClock::new(0.0);
        let mut session =
            ReaderSession::new(opts, Rc::new(transport.clone()), Rc::new(clock.clone()));
        let mut doc = SyntheticDoc::new(viewport);
        let content = doc.content();
        session.load_document(&mut doc, Box::new(content), batch, 0.0);

        Ok(Self {
            session,
            transport,
            clock,
            doc,
            backend,
        })
    }

    fn scroll_to(&mut self, percent: f64) -> anyhow::Result<()> {
        self.doc.scroll_to(percent)?;
        self.transport.deliver_pending();
        Ok(())
    }

    fn render(&mut self, now_ms: f64) -> anyhow::Result<FrameRGBA> {
        self.clock.set(now_ms);
        Ok(self.session.render(now_ms, &mut self.backend)?)
    }
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let batch = WaypointBatch::from_path(&args.waypoints)
        .with_context(|| format!("load waypoints '{}'", args.waypoints.display()))?;
    for (a, b) in batch.overlapping_windows() {
        eprintln!("overlap: '{a}' and '{b}' (first in list wins)");
    }
    let json = serde_json::to_string_pretty(batch.waypoints()).context("serialize batch")?;
    println!("{json}");
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.scroll.is_finite(), "--scroll must be finite");
    anyhow::ensure!(
        args.time_ms.is_finite() && args.time_ms >= 0.0,
        "--time-ms must be finite and >= 0"
    );
    let mut driver = Driver::new(&args.scene)?;
    driver.scroll_to(args.scroll)?;

    // Warm up so trails reach their steady length before the captured frame.
    let step = 16.0;
    let warmup = driver.session.renderer().opts().trail_len as f64 * step;
    let mut frame = driver.render(0.0)?;
    if args.time_ms > 0.0 {
        let mut t = (args.time_ms - warmup).max(step);
        while t < args.time_ms {
            driver.render(t)?;
            t += step;
        }
        frame = driver.render(args.time_ms)?;
    }

    tracing::info!(status = ?driver.session.status(), "frame rendered");
    write_png(&args.out, frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.frames > 0, "--frames must be > 0");
    anyhow::ensure!(
        args.frame_ms.is_finite() && args.frame_ms > 0.0,
        "--frame-ms must be finite and > 0"
    );
    let mut driver = Driver::new(&args.scene)?;

    let changes: Rc<RefCell<Vec<SceneChange>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = changes.clone();
    driver.session.on_scene_change(Box::new(move |c: &SceneChange| {
        tracing::info!(
            from = c.previous.as_deref().unwrap_or("-"),
            to = c.current.as_deref().unwrap_or("-"),
            scroll = c.scroll_fraction,
            "scene change"
        );
        sink.borrow_mut().push(c.clone());
    }));

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let last = f64::from(args.frames.saturating_sub(1).max(1));
    for i in 0..args.frames {
        let now = f64::from(i) * args.frame_ms;
        driver.clock.set(now);
        driver.scroll_to(f64::from(i) / last * 100.0)?;
        let frame = driver.render(now)?;
        write_png(&args.out_dir.join(format!("frame_{i:04}.png")), frame)?;
    }

    eprintln!(
        "wrote {} frames to {} ({} scene changes)",
        args.frames,
        args.out_dir.display(),
        changes.borrow().len()
    );
    Ok(())
}

fn write_png(path: &Path, mut frame: FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.unpremultiply();
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

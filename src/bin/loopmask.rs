use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use loopmask::{
    Compositor, EditorState, EditorStore, LayerId, MAX_SURFACE_DIM, PROJECT_FILE, PlaybackClock,
    PlaybackLoop, Project, RenderOptions, Surface, ThreadTimer, TimerHost, VirtualTimer,
};

#[derive(Parser, Debug)]
#[command(name = "loopmask", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single composited frame as a PNG.
    Frame(FrameArgs),
    /// Run the playback loop and write one PNG per advanced frame.
    Play(PlayArgs),
    /// Print canvas size and per-layer frame counts.
    Info(InfoArgs),
    /// Copy a project and its assets into a self-contained directory.
    Snapshot(SnapshotArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON. Asset paths resolve relative to its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame cursor; wraps per layer. Negative values count back from the end.
    #[arg(long, allow_hyphen_values = true)]
    frame: i64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Zoom factor; overrides the project's zoom.
    #[arg(long)]
    zoom: Option<f64>,

    /// Draw a highlight outline around these layer ids.
    #[arg(long = "border")]
    borders: Vec<u64>,

    /// Draw this layer's mask instead of its masked frame.
    #[arg(long)]
    mask_preview: Option<u64>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input project JSON. Asset paths resolve relative to its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving `frame_NNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of scheduler ticks to run.
    #[arg(long, default_value_t = 10)]
    ticks: u64,

    /// Sleep for the scheduled delays instead of running on a virtual clock.
    #[arg(long)]
    realtime: bool,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    /// Input project JSON. Asset paths resolve relative to its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving the manifest, animations and masks.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
        Command::Info(args) => cmd_info(args),
        Command::Snapshot(args) => cmd_snapshot(args),
    }
}

fn read_project(path: &Path) -> anyhow::Result<(Project, EditorState)> {
    let project = Project::from_path(path)?;
    project.validate()?;
    let assets_root = path.parent().unwrap_or_else(|| Path::new("."));
    let state = project
        .load(assets_root)
        .with_context(|| format!("load project '{}'", path.display()))?;
    Ok((project, state))
}

fn render_state(
    compositor: &mut Compositor,
    state: &EditorState,
    opts: &RenderOptions,
) -> anyhow::Result<Surface> {
    let doc = state.document();
    let (w, h) = doc.canvas().scaled(state.zoom());
    if w > MAX_SURFACE_DIM || h > MAX_SURFACE_DIM {
        anyhow::bail!(
            "rendered frame {w}x{h} exceeds the {MAX_SURFACE_DIM}px limit; lower --zoom"
        );
    }
    let mut out = Surface::new(w, h);
    compositor.render(
        doc,
        state.current_frame_index() as u64,
        state.zoom(),
        &mut out,
        opts,
    );
    Ok(out)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (_, mut state) = read_project(&args.in_path)?;
    if let Some(zoom) = args.zoom {
        state = state.set_zoom(zoom)?;
    }
    let state = state.set_active_frame(args.frame);

    let mut opts = RenderOptions {
        mask_preview: args.mask_preview.map(LayerId),
        ..RenderOptions::default()
    };
    for id in args.borders {
        opts = opts.with_border(LayerId(id));
    }

    let surface = render_state(&mut Compositor::new(), &state, &opts)?;
    ensure_parent(&args.out)?;
    surface.save_png(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let (project, state) = read_project(&args.in_path)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let clock = PlaybackClock::new(project.clock());
    let store = EditorStore::new(state.set_playing(true));
    if args.realtime {
        play(clock, store, ThreadTimer, &args)
    } else {
        play(clock, store, VirtualTimer::new(), &args)
    }
}

fn play<T: TimerHost>(
    clock: PlaybackClock,
    store: EditorStore,
    timer: T,
    args: &PlayArgs,
) -> anyhow::Result<()> {
    let mut playback = PlaybackLoop::new(clock, store, timer);
    let stop = playback.stop_token();
    let mut compositor = Compositor::new();
    let mut seen = 0u64;
    let mut failure = None;

    playback.run(|state, tick| {
        seen += 1;
        println!(
            "tick {seen}: frame {} delay {}ms",
            tick.frame_index,
            tick.delay.as_millis()
        );
        if tick.advanced && !state.document().canvas().is_empty() {
            let path = args.out_dir.join(format!("frame_{seen:04}.png"));
            let written = render_state(&mut compositor, state, &RenderOptions::default())
                .and_then(|surface| surface.save_png(&path).map_err(anyhow::Error::from));
            if let Err(err) = written {
                failure = Some(err);
                stop.stop();
                return;
            }
        }
        if seen >= args.ticks {
            stop.stop();
        }
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let (project, state) = read_project(&args.in_path)?;
    let doc = state.document();
    let canvas = doc.canvas();

    println!("canvas: {}x{}", canvas.width, canvas.height);
    println!("frames: {}", doc.frame_count());
    println!("zoom: {}", state.zoom());
    for (def, layer) in project.def().layers.iter().zip(doc.layers()) {
        let source = def
            .source
            .as_deref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string());
        let loop_cs = layer.frames().map_or(0, |f| f.total_duration());
        println!(
            "{}: {} frames, {}x{}, loop {}cs, source {}{}{}",
            layer.id(),
            layer.frame_count(),
            layer.width(),
            layer.height(),
            loop_cs,
            source,
            if layer.mask().is_some() { ", masked" } else { "" },
            if layer.is_hidden() { ", hidden" } else { "" },
        );
    }
    Ok(())
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let (project, state) = read_project(&args.in_path)?;
    Project::snapshot(&state, project.clock(), &args.out_dir)
        .with_context(|| format!("snapshot into '{}'", args.out_dir.display()))?;

    eprintln!("wrote {}", args.out_dir.join(PROJECT_FILE).display());
    Ok(())
}

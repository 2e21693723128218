//! gesture-zoom CLI
//!
//! Runs the gesture detector, the zoom display, or both in one process.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gesture_zoom::{
    capture::{FrameCollector, FrameSource, ImageSequenceSource, SyntheticSource},
    config::Config,
    core::{Detector, DetectorSettings},
    mailbox::{DirectoryMailbox, GestureChannel, MemoryMailbox},
    record::{create_shared_stats, SharedRunStats},
    zoom::{load_base_image, DirectoryDisplay, DisplayLoop, ZoomEngine},
    VERSION,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Frames buffered between capture and detection.
const FRAME_BUFFER: usize = 4;

/// Grace period for the display to take the last event before a
/// simulation shuts down.
const SIMULATE_DRAIN: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "gesture-zoom")]
#[command(version = VERSION)]
#[command(about = "Detect swipe gestures from camera motion and drive a zoom display", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gesture detector and publish gestures to the mailbox
    Detect {
        /// Directory of image frames, replayed in file-name order
        #[arg(long, conflicts_with = "synthetic")]
        frames: Option<PathBuf>,

        /// Generated gesture script (swipe, zoom-in, zoom-out, zoom)
        #[arg(long)]
        synthetic: Option<String>,

        /// Mailbox directory (overrides the configured one)
        #[arg(long)]
        mailbox: Option<PathBuf>,
    },

    /// Run the zoom display against the mailbox
    Display {
        /// Image to zoom into
        #[arg(long)]
        image: PathBuf,

        /// Directory receiving one PNG per rendered frame
        #[arg(long, short)]
        output: PathBuf,

        /// Mailbox directory (overrides the configured one)
        #[arg(long)]
        mailbox: Option<PathBuf>,
    },

    /// Run detector and display in one process on synthetic frames
    Simulate {
        /// Image to zoom into
        #[arg(long)]
        image: PathBuf,

        /// Directory receiving one PNG per rendered frame
        #[arg(long, short)]
        output: PathBuf,

        /// Gesture script (swipe, zoom-in, zoom-out, zoom)
        #[arg(long, default_value = "zoom")]
        path: String,

        /// Delay between synthetic frames in milliseconds
        #[arg(long, default_value = "33")]
        frame_delay_ms: u64,
    },

    /// Show configuration
    Config,

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::config_path);

    match cli.command {
        Commands::Detect {
            frames,
            synthetic,
            mailbox,
        } => cmd_detect(&config_path, frames, synthetic, mailbox),
        Commands::Display {
            image,
            output,
            mailbox,
        } => cmd_display(&config_path, &image, &output, mailbox),
        Commands::Simulate {
            image,
            output,
            path,
            frame_delay_ms,
        } => cmd_simulate(&config_path, &image, &output, &path, frame_delay_ms),
        Commands::Config => cmd_config(&config_path),
        Commands::InitConfig { force } => cmd_init_config(&config_path, force),
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load_from(path).with_context(|| format!("Failed to load configuration from {path:?}"))
}

/// Install the log subscriber; `RUST_LOG` overrides the configured level.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn cmd_detect(
    config_path: &Path,
    frames: Option<PathBuf>,
    synthetic: Option<String>,
    mailbox: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    init_tracing(config.misc.debug);
    config
        .ensure_directories()
        .context("Failed to create data directories")?;

    println!("gesture-zoom detector v{VERSION}");
    println!();

    let source: Box<dyn FrameSource + Send> = match (frames, synthetic) {
        (Some(dir), _) => {
            let source =
                ImageSequenceSource::open(&dir, config.image.resolution, config.image.blur_region)
                    .with_context(|| format!("Failed to open frames in {dir:?}"))?;
            println!("  Frames: {} from {dir:?}", source.remaining());
            Box::new(source)
        }
        (None, Some(name)) => {
            let source = synthetic_source(&name, &config)?;
            println!("  Frames: {} synthetic ({name})", source.len());
            Box::new(source)
        }
        (None, None) => bail!("No frame source given; pass --frames <dir> or --synthetic <script>"),
    };

    let mailbox_dir = mailbox.unwrap_or_else(|| config.mailbox_path.clone());
    let channel = DirectoryMailbox::open(&mailbox_dir)
        .with_context(|| format!("Failed to open mailbox {mailbox_dir:?}"))?;
    println!("  Mailbox: {mailbox_dir:?}");
    println!("  Frame limit: {}", config.misc.frame_limit);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    let stats = create_shared_stats();
    run_detector(&config, source, Arc::new(channel), stats.clone(), &running, None)?;

    println!();
    println!("{}", stats.summary());
    Ok(())
}

fn cmd_display(
    config_path: &Path,
    image: &Path,
    output: &Path,
    mailbox: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    init_tracing(config.misc.debug);

    let mailbox_dir = mailbox.unwrap_or_else(|| config.mailbox_path.clone());
    let channel = DirectoryMailbox::open(&mailbox_dir)
        .with_context(|| format!("Failed to open mailbox {mailbox_dir:?}"))?;

    println!("gesture-zoom display v{VERSION}");
    println!();
    println!("  Image: {image:?}");
    println!("  Mailbox: {mailbox_dir:?}");
    println!("  Output: {output:?}");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    let stats = create_shared_stats();
    let mut display_loop = build_display_loop(&config, image, Arc::new(channel), stats.clone())?;
    let mut display = DirectoryDisplay::open(output, running)
        .with_context(|| format!("Failed to open output directory {output:?}"))?;
    display_loop.run(&mut display)?;

    println!();
    println!("Final stage: {}", display_loop.engine().stage());
    println!("Frames written: {}", display.frames_written());
    println!("{}", stats.summary());
    Ok(())
}

fn cmd_simulate(
    config_path: &Path,
    image: &Path,
    output: &Path,
    script: &str,
    frame_delay_ms: u64,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    init_tracing(config.misc.debug);
    config
        .ensure_directories()
        .context("Failed to create data directories")?;

    let source = synthetic_source(script, &config)?;
    println!("gesture-zoom simulation v{VERSION}");
    println!();
    println!("  Script: {script} ({} frames)", source.len());
    println!("  Output: {output:?}");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    let stats = create_shared_stats();
    let channel: Arc<dyn GestureChannel> = Arc::new(MemoryMailbox::new());

    let mut display_loop = build_display_loop(&config, image, channel.clone(), stats.clone())?;
    let mut display = DirectoryDisplay::open(output, running.clone())
        .with_context(|| format!("Failed to open output directory {output:?}"))?;
    let display_thread = thread::spawn(move || {
        display_loop
            .run(&mut display)
            .map(|_| (display_loop.engine().stage(), display.frames_written()))
    });

    let pace = Some(Duration::from_millis(frame_delay_ms));
    let detected = run_detector(&config, Box::new(source), channel, stats.clone(), &running, pace);

    thread::sleep(SIMULATE_DRAIN);
    running.store(false, Ordering::SeqCst);
    let displayed = display_thread
        .join()
        .map_err(|_| anyhow::anyhow!("Display thread panicked"))?;

    detected?;
    let (stage, frames_written) = displayed?;

    println!();
    println!("Final stage: {stage}");
    println!("Frames written: {frames_written}");
    println!("{}", stats.summary());
    Ok(())
}

fn cmd_config(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {config_path:?}");
    if !config_path.exists() {
        println!("(not present, showing defaults)");
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!();
    println!("Derived y threshold: {}", config.y_threshold());
    println!("Zoom step factor: {}", config.zoom.step_factor());
    Ok(())
}

fn cmd_init_config(config_path: &Path, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        println!("Configuration already exists at {config_path:?}");
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    Config::default()
        .save_to(config_path)
        .with_context(|| format!("Failed to write configuration to {config_path:?}"))?;
    println!("Wrote default configuration to {config_path:?}");
    Ok(())
}

fn synthetic_source(name: &str, config: &Config) -> anyhow::Result<SyntheticSource> {
    SyntheticSource::script(name, config.image.resolution, config.data.window_size).with_context(
        || format!("Unknown synthetic script {name:?}; use swipe, zoom-in, zoom-out or zoom"),
    )
}

fn build_display_loop(
    config: &Config,
    image: &Path,
    channel: Arc<dyn GestureChannel>,
    stats: SharedRunStats,
) -> anyhow::Result<DisplayLoop> {
    let base = load_base_image(image, config.zoom.screen_width, config.zoom.screen_height)
        .with_context(|| format!("Failed to load image {image:?}"))?;
    let engine = ZoomEngine::new(base, &config.zoom);
    Ok(DisplayLoop::new(engine, channel, stats))
}

/// Run the detector to completion and dump its run record.
fn run_detector(
    config: &Config,
    source: Box<dyn FrameSource + Send>,
    channel: Arc<dyn GestureChannel>,
    stats: SharedRunStats,
    running: &AtomicBool,
    pace: Option<Duration>,
) -> anyhow::Result<()> {
    let mut collector = FrameCollector::spawn(source, FRAME_BUFFER);
    let mut detector = Detector::new(DetectorSettings::from_config(config), channel, stats);

    let frames = collector.frames().inspect(|_| {
        if let Some(delay) = pace {
            thread::sleep(delay);
        }
    });
    let reports = detector.run(frames, running);
    collector.stop();

    tracing::info!(
        samples = detector.samples_taken(),
        windows = reports.len(),
        "Detector finished"
    );

    let record = detector.finish();
    let dump = record.dump_path(&config.data_path);
    record
        .save(&dump)
        .with_context(|| format!("Failed to write run record to {dump:?}"))?;
    println!("Run record written to {dump:?}");
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")
}

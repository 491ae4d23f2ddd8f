//! voxmark - headless driver for the viewer bridge
//!
//! Runs the compositing pipeline against a synthetic moving-sphere dataset.

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod headless;

#[derive(Parser)]
#[command(name = "voxmark")]
#[command(author, version, about = "Spot-colored volume compositing, headless")]
#[command(long_about = "
Drives the voxmark bridge without a GUI: a synthetic sphere moves through a
volume while a tracked spot follows it.

Examples:
  voxmark demo                          # Event storm against a headless viewer
  voxmark demo --producers 8 --play 10  # More threads, then step 10 frames
  voxmark render -t 20 -o frame.png     # One pass, centre z-slice as PNG
  voxmark -c voxmark.yaml config        # Print the effective config
  voxmark -vv render -t 5 -z 40 -o slice.png
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach to a headless viewer and fire an event storm
    Demo(DemoArgs),

    /// Composite one time index and write a z-slice as PNG
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Shape of the synthetic dataset.
#[derive(Args, Clone, Copy)]
struct DatasetArgs {
    /// Volume edge length in voxels
    #[arg(long, default_value = "100")]
    size: usize,

    /// Number of time indices
    #[arg(long, default_value = "50")]
    frames: usize,

    /// Sphere radius in voxels
    #[arg(long, default_value = "20")]
    radius: f32,
}

#[derive(Args)]
struct DemoArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Threads firing viewer events
    #[arg(long, default_value = "4")]
    producers: usize,

    /// Events per producer
    #[arg(long, default_value = "500")]
    events: usize,

    /// Time index the viewer starts at
    #[arg(short = 't', long, default_value = "20")]
    time: usize,

    /// Frames to step through after the storm
    #[arg(long, default_value = "0")]
    play: usize,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Time index to composite
    #[arg(short = 't', long, default_value = "20")]
    time: usize,

    /// Z slice to write (default: centre)
    #[arg(short = 'z', long)]
    slice: Option<usize>,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct ConfigArgs {
    /// Print built-in defaults, ignoring --config
    #[arg(long)]
    defaults: bool,
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let verbose = cli.verbose > 0;
    match cli.command {
        Commands::Demo(args) => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::demo::run(args, config, verbose)
        }
        Commands::Render(args) => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::render::run(args, config, verbose)
        }
        Commands::Config(args) => commands::config::run(args, cli.config.as_deref()),
    }
}

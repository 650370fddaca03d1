//! swiped - replay recorded touch input through the swipe recognizer
//!
//! Subcommands:
//! - `replay`: print every swipe a trace produces
//! - `carousel`: print the clips a trace would load in the carousel

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use swiped::carousel::Carousel;
use swiped::replay::{Outcome, Trace};
use swiped::Settings;

#[derive(Parser, Debug)]
#[command(name = "swiped")]
#[command(about = "Replay touch traces through the swipe recognizer", long_about = None)]
struct Args {
    /// Enable verbose debug output
    #[arg(short, long)]
    debug: bool,

    /// Also write logs to a daily rotated file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Settings file with [gestures] and [carousel] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the swipes recognized in a trace
    Replay {
        trace: PathBuf,

        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// Drive the clip carousel with a trace
    Carousel {
        trace: PathBuf,

        /// Seed for clip selection, for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
}

fn install_panic_hook(log_dir: Option<PathBuf>) {
    std::panic::set_hook(Box::new(move |panic_info| {
        eprintln!("PANIC: {}", panic_info);
        if let Some(dir) = &log_dir {
            if let Ok(mut f) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("crash.log"))
            {
                use std::io::Write;
                let _ = writeln!(f, "[{}] PANIC: {}", chrono::Local::now(), panic_info);
            }
        }
    }));
}

fn print(outcomes: &[Outcome], json: bool) -> Result<()> {
    for outcome in outcomes {
        if json {
            println!("{}", serde_json::to_string(outcome)?);
        } else {
            println!("{}", outcome.describe());
        }
    }
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn load_trace(path: &Path) -> Result<Trace> {
    Trace::load(path).with_context(|| format!("failed to load trace {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(dir) = &args.log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    install_panic_hook(args.log_dir.clone());

    // Quiet by default, verbose with --debug
    let default_filter = if args.debug {
        "debug,swiped=debug"
    } else {
        "warn,swiped=info"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, _guard) = match &args.log_dir {
        Some(dir) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(rolling::daily(dir, "swiped.log"));
            (
                Some(fmt::layer().with_writer(non_blocking).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    let settings = load_settings(args.config.as_deref())?;

    match args.command {
        Command::Replay { trace, json } => {
            let trace = load_trace(&trace)?;
            let outcomes = trace.swipes(&settings.gestures)?;
            info!(swipes = outcomes.len(), "Replay finished");
            print(&outcomes, json)
        }
        Command::Carousel { trace, seed, json } => {
            let trace = load_trace(&trace)?;
            let mut carousel = match seed {
                Some(seed) => Carousel::seeded(settings.carousel.clone(), seed),
                None => Carousel::from_entropy(settings.carousel.clone()),
            };
            let outcomes = trace.drive(&settings.gestures, &mut carousel)?;
            info!(history = ?carousel.history(), "Carousel run finished");
            print(&outcomes, json)
        }
    }
}

//! Synheart Load Engine CLI
//!
//! Estimates cognitive load from keyboard and pointer timing, either live from
//! JSON events on stdin or from a recorded session.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use synheart_load_engine::{
    collector::load_recording,
    config::Config,
    core::MetricsSnapshot,
    telemetry::iso_timestamp,
    Clock, EngineRunner, InputEvent, InputFeed, LoadEngine, ManualClock, ManualScheduler,
    SystemClock, VERSION,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synheart-load")]
#[command(author = "Synheart")]
#[command(version = VERSION)]
#[command(about = "Real-time cognitive load estimation from input timing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded JSON-lines input session
    Replay {
        /// Recording to replay
        file: PathBuf,

        /// Keep ticking this long (ms) after the last event
        #[arg(long, default_value = "6000")]
        tail_ms: i64,

        /// Print snapshots as JSON lines
        #[arg(long)]
        json: bool,

        /// Write the telemetry CSV into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Monitor live input events read as JSON lines from stdin
    Monitor {
        /// Print snapshots as JSON lines
        #[arg(long)]
        json: bool,

        /// Directory for the telemetry CSV (defaults to the configured export path)
        #[arg(long)]
        export: Option<PathBuf>,

        /// Skip the telemetry export on exit
        #[arg(long)]
        no_export: bool,
    },

    /// Show configuration
    Config {
        /// Write the default configuration to disk
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            file,
            tail_ms,
            json,
            export,
        } => cmd_replay(&file, tail_ms, json, export.as_deref()),
        Commands::Monitor {
            json,
            export,
            no_export,
        } => cmd_monitor(json, export, no_export),
        Commands::Config { init } => cmd_config(init),
    }
}

/// Log to stderr so stdout carries only metrics.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Serialize)]
struct SnapshotLine<'a> {
    at: String,
    #[serde(flatten)]
    snapshot: &'a MetricsSnapshot,
}

fn print_snapshot(at_ms: i64, snapshot: &MetricsSnapshot, json: bool) -> Result<()> {
    if json {
        let line = SnapshotLine {
            at: iso_timestamp(at_ms),
            snapshot,
        };
        println!("{}", serde_json::to_string(&line)?);
    } else {
        println!(
            "[{}] load {:6.2} | volatility {:8.2} | samples {:4} | buffer {:4} | anomalies {}{}",
            iso_timestamp(at_ms),
            snapshot.load,
            snapshot.volatility,
            snapshot.sample_count,
            snapshot.buffer_size,
            snapshot.anomaly_count,
            if snapshot.idle { " | idle" } else { "" }
        );
    }
    Ok(())
}

fn cmd_replay(file: &Path, tail_ms: i64, json: bool, export: Option<&Path>) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let inputs = load_recording(file)
        .with_context(|| format!("Failed to read recording {}", file.display()))?;

    let start = inputs.first().map(|i| i.timestamp_ms).unwrap_or(0);
    let end = inputs.last().map(|i| i.timestamp_ms).unwrap_or(start) + tail_ms.max(0);

    let clock = ManualClock::new(start);
    let mut engine = LoadEngine::new(config.engine, Arc::new(clock.clone()))?;
    engine.start()?;
    let mut scheduler = ManualScheduler::new(&engine, clock.clone());

    tracing::info!(events = inputs.len(), file = %file.display(), "replaying recording");

    for input in &inputs {
        for tick in scheduler.feed(&mut engine, input) {
            print_snapshot(tick.at_ms, &tick.snapshot, json)?;
        }
    }
    for tick in scheduler.advance_to(&mut engine, end) {
        print_snapshot(tick.at_ms, &tick.snapshot, json)?;
    }

    engine.stop();

    if let Some(dir) = export {
        let path = engine
            .export_to_dir(dir)
            .context("Failed to export telemetry")?;
        tracing::info!(path = %path.display(), "exported telemetry");
    }

    eprintln!();
    eprintln!("{}", engine.telemetry().summary(clock.now_ms()));
    Ok(())
}

fn cmd_monitor(json: bool, export: Option<PathBuf>, no_export: bool) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let mut feed = InputFeed::new();
    feed.start()?;

    let engine = LoadEngine::new(config.engine.clone(), Arc::new(SystemClock))?;
    let mut runner = EngineRunner::spawn(engine, feed.receiver().clone())?;

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(Arc::clone(&running))?;

    let input_done = Arc::new(AtomicBool::new(false));
    spawn_stdin_reader(feed.sender(), Arc::clone(&input_done))?;

    eprintln!("Synheart Load Engine v{VERSION}");
    eprintln!("Reading input events from stdin. Press Ctrl+C to stop.");

    while running.load(Ordering::SeqCst) && !input_done.load(Ordering::SeqCst) {
        match runner.updates().recv_timeout(Duration::from_millis(100)) {
            Ok(snapshot) => print_snapshot(SystemClock.now_ms(), &snapshot, json)?,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                tracing::warn!("engine thread exited unexpectedly");
                break;
            }
        }
    }

    eprintln!();
    eprintln!("Stopping...");
    feed.stop();
    let dropped = feed.dropped_count();
    if dropped > 0 {
        tracing::warn!(dropped, "input events were dropped during bursts");
    }

    let Some(engine) = runner.stop() else {
        anyhow::bail!("engine thread did not shut down cleanly");
    };

    if !no_export {
        let dir = export.unwrap_or(config.export_path);
        let path = engine
            .export_to_dir(&dir)
            .context("Failed to export telemetry")?;
        eprintln!("Exported telemetry to {}", path.display());
    }

    eprintln!();
    eprintln!("{}", engine.telemetry().summary(engine.now_ms()));
    Ok(())
}

/// Forward stdin JSON lines into the feed until EOF.
fn spawn_stdin_reader(
    sender: synheart_load_engine::FeedSender,
    done: Arc<AtomicBool>,
) -> Result<()> {
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for (index, line) in stdin.lock().lines().enumerate() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("stdin read failed: {e}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<InputEvent>(&line) {
                    Ok(event) => {
                        sender.push(event);
                    }
                    Err(e) => tracing::warn!(line = index + 1, "skipping malformed event: {e}"),
                }
            }
            done.store(true, Ordering::SeqCst);
        })
        .context("Failed to spawn stdin reader")?;
    Ok(())
}

fn cmd_config(init: bool) -> Result<()> {
    let config = if init {
        let config = Config::default();
        config.save().context("Failed to save configuration")?;
        config
            .ensure_directories()
            .context("Failed to create export directory")?;
        println!("Wrote default configuration.");
        config
    } else {
        Config::load().context("Failed to load configuration")?
    };

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")
}

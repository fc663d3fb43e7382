//! # Palletizer Control Unit
//!
//! Runs the palletizing cell against simulated hardware on a fixed-period
//! tick loop.
//!
//! Without a config path the reference cell is used: 10 ms ticks, 48 boxes
//! per pallet, cell activated before the first tick. The loop runs until
//! SIGINT or until `--ticks` ticks have elapsed.

use clap::Parser;
use pallet_common::prelude::*;
use pallet_control_unit::cycle::{TickScheduler, rt_setup};
use pallet_control_unit::timer::MonotonicClock;
use pallet_hal::simulated_rig;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Palletizer Control Unit - cooperative tick loop for a palletizing cell
#[derive(Parser, Debug)]
#[command(name = "pallet_control_unit")]
#[command(version)]
#[command(about = "Fixed-period cooperative control loop for a palletizing cell")]
struct Args {
    /// Path to the cell configuration TOML. Reference values if omitted.
    config: Option<PathBuf>,

    /// Stop after this many ticks (default: run until SIGINT).
    #[arg(long, value_name = "N")]
    ticks: Option<u64>,

    /// CPU core to pin the loop to (`rt` feature only).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (`rt` feature only).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level, per-tick telemetry).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PalletizerConfig::load_validated(path),
        None => Ok(PalletizerConfig::default()),
    };
    let log_level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!(
        "Palletizer Control Unit v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let result = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, &config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Palletizer Control Unit shutdown complete");
}

fn run(args: &Args, config: &PalletizerConfig) -> Result<(), Box<dyn std::error::Error>> {
    match &args.config {
        Some(path) => info!("Config loaded from {}", path.display()),
        None => info!("No config given, using reference cell"),
    }
    info!(
        service = %config.shared.service_name,
        period_us = config.cycle.period_us,
        boxes_per_pallet = config.stacking.boxes_per_pallet,
        arena_bytes = config.tasks.arena_bytes,
        "Config OK"
    );

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let rig = simulated_rig(&config.simulation);
    let mut scheduler = TickScheduler::new(config, rig, MonotonicClock::new())?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let summary = scheduler.run(&running, args.ticks)?;
    info!(
        "Stacked {} boxes on {} full pallets in {} ticks ({} overruns)",
        summary.boxes_stacked, summary.pallets_completed, summary.ticks, summary.overruns
    );
    Ok(())
}

/// Setup tracing subscriber. `RUST_LOG` wins over `--verbose`, which wins
/// over the configured level.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        log_level.as_directive()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

//! Tick pacing and overrun accounting through the scheduler.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use pallet_common::prelude::*;
use pallet_control_unit::cycle::TickScheduler;
use pallet_control_unit::timer::{ManualClock, MonotonicClock};
use pallet_hal::simulated_rig;

const PERIOD_NS: i64 = 10_000_000;

fn with_clock(config: &PalletizerConfig) -> (TickScheduler<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let scheduler =
        TickScheduler::new(config, simulated_rig(&config.simulation), clock.clone())
            .expect("scheduler");
    (scheduler, clock)
}

#[test]
fn overrun_resyncs_next_period() {
    let config = PalletizerConfig::default();
    let (mut scheduler, clock) = with_clock(&config);

    let slack = scheduler.tick().expect("tick");
    assert_eq!(slack.slack_ns, PERIOD_NS);
    assert_eq!(clock.now(), PERIOD_NS);

    clock.advance(25_000_000);
    let slack = scheduler.tick().expect("tick");
    assert!(slack.is_overrun());
    assert_eq!(slack.slack_ns, -15_000_000);
    // No sleep after an overrun.
    assert_eq!(clock.now(), 35_000_000);

    // Next period is measured from the overrun's completion.
    let slack = scheduler.tick().expect("tick");
    assert_eq!(slack.slack_ns, PERIOD_NS);
    assert_eq!(clock.now(), 45_000_000);

    let summary = scheduler.summary();
    assert_eq!(summary.overruns, 1);
    assert_eq!(summary.stats.tick_count, 3);
}

#[test]
fn overruns_never_stop_the_cell() {
    let config = PalletizerConfig::default();
    let (mut scheduler, clock) = with_clock(&config);

    for _ in 0..100 {
        clock.advance(2 * PERIOD_NS);
        scheduler.tick().expect("tick");
    }
    let summary = scheduler.summary();
    assert_eq!(summary.overruns, 100);
    assert!(!scheduler.cell().settings().has_error());
    assert!(scheduler.arm().is_alive());
    assert!(summary.boxes_stacked >= 2);
}

#[test]
fn run_paces_to_period_boundaries() {
    let config = PalletizerConfig::default();
    let (mut scheduler, clock) = with_clock(&config);
    let running = AtomicBool::new(true);

    let summary = scheduler.run(&running, Some(100)).expect("run");
    assert_eq!(summary.ticks, 100);
    assert_eq!(summary.overruns, 0);
    assert_eq!(clock.now(), 100 * PERIOD_NS);
}

#[test]
fn telemetry_follows_interval() {
    let mut config = PalletizerConfig::default();
    config.cycle.telemetry_interval = 10;
    let (mut scheduler, _clock) = with_clock(&config);

    for _ in 0..15 {
        scheduler.tick().expect("tick");
    }
    let snapshot = scheduler.last_telemetry().expect("telemetry");
    assert_eq!(snapshot.tick, 10);
    assert_eq!(snapshot.slack_ns, PERIOD_NS);
}

#[test]
fn wall_clock_run_takes_at_least_its_periods() {
    let mut config = PalletizerConfig::default();
    config.cycle.period_us = 1_000;
    let mut scheduler =
        TickScheduler::new(&config, simulated_rig(&config.simulation), MonotonicClock::new())
            .expect("scheduler");
    let running = AtomicBool::new(true);

    let start = Instant::now();
    let summary = scheduler.run(&running, Some(20)).expect("run");
    let elapsed = start.elapsed();

    assert_eq!(summary.ticks, 20);
    assert!(elapsed.as_micros() >= 19_000, "elapsed {elapsed:?}");
}

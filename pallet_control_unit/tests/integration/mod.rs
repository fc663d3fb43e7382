//! Shared helpers for the scheduler-level tests.

mod choreography;
mod error_recovery;
mod magazine_reload;
mod nesting;
mod timing;

use pallet_common::prelude::*;
use pallet_control_unit::cycle::TickScheduler;
use pallet_control_unit::timer::ManualClock;
use pallet_hal::simulated_rig;

/// Cell state at the end of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub tick: u64,
    pub arm: ArmState,
    pub inlet: InletState,
    pub magazine: MagazineState,
    pub nr_boxes: u64,
    pub position: Position,
}

pub fn scheduler(config: &PalletizerConfig) -> TickScheduler<ManualClock> {
    TickScheduler::new(config, simulated_rig(&config.simulation), ManualClock::new())
        .expect("scheduler")
}

/// Reference config with a custom operator script.
pub fn scripted(events: &[(u64, OperatorAction)]) -> PalletizerConfig {
    let mut config = PalletizerConfig::default();
    config.operator.events = events
        .iter()
        .map(|&(tick, action)| OperatorEvent { tick, action })
        .collect();
    config
}

/// Run `ticks` ticks and record the cell after each one.
pub fn record(scheduler: &mut TickScheduler<ManualClock>, ticks: u64) -> Vec<Frame> {
    (0..ticks)
        .map(|_| {
            let tick = scheduler.ticks();
            scheduler.tick().expect("tick");
            let cell = scheduler.cell();
            Frame {
                tick,
                arm: cell.arm_state(),
                inlet: cell.inlet_state(),
                magazine: cell.magazine_state(),
                nr_boxes: cell.nr_boxes(),
                position: cell.rig().position(),
            }
        })
        .collect()
}

/// First frame whose arm state differs from the previous frame's.
pub fn transitions(frames: &[Frame]) -> Vec<Frame> {
    let mut out = Vec::new();
    let mut prev: Option<ArmState> = None;
    for frame in frames {
        if prev != Some(frame.arm) {
            out.push(*frame);
        }
        prev = Some(frame.arm);
    }
    out
}

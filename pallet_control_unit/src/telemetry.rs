//! Read-only per-tick snapshot of the cell.
//!
//! Built from the public queries of the workcell after all tasks stepped,
//! then emitted as one structured `debug!` event.

use pallet_common::prelude::{ArmState, GripperStatus, InletState, MagazineState};
use tracing::{debug, warn};

use crate::timer::TickSlack;
use crate::workcell::Workcell;

/// One telemetry line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub tick: u64,
    pub arm: ArmState,
    pub inlet: InletState,
    pub magazine: MagazineState,
    pub gripper: GripperStatus,
    /// x, y, z moving flags.
    pub axes_moving: [bool; 3],
    pub nr_boxes: u64,
    pub active: bool,
    pub error_count: u32,
    pub slack_ns: i64,
}

impl Telemetry {
    pub fn capture(tick: u64, cell: &Workcell, slack: TickSlack) -> Self {
        Self {
            tick,
            arm: cell.arm_state(),
            inlet: cell.inlet_state(),
            magazine: cell.magazine_state(),
            gripper: cell.rig().gripper_status(),
            axes_moving: cell.rig().axes_moving(),
            nr_boxes: cell.nr_boxes(),
            active: cell.settings().is_active(),
            error_count: cell.settings().error_count(),
            slack_ns: slack.slack_ns,
        }
    }

    pub fn emit(&self) {
        let [x, y, z] = self.axes_moving.map(motion_label);
        debug!(
            tick = self.tick,
            arm = ?self.arm,
            inlet = ?self.inlet,
            magazine = ?self.magazine,
            gripper = self.gripper.label(),
            x,
            y,
            z,
            nr_boxes = self.nr_boxes,
            active = self.active,
            errors = self.error_count,
            slack_ms = ns_to_ms(self.slack_ns),
            "tick"
        );
    }
}

/// Warn about a tick that used up its whole period.
pub fn report_overrun(tick: u64, slack: TickSlack) {
    warn!(
        tick,
        "took {:.3} ms too long",
        ns_to_ms(-slack.slack_ns)
    );
}

fn motion_label(moving: bool) -> &'static str {
    if moving { "move" } else { "still" }
}

fn ns_to_ms(ns: i64) -> f64 {
    ns as f64 / 1_000_000.0
}

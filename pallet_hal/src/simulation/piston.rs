//! Two-position piston model for the gripper.

use pallet_common::hal::driver::Gripper;
use tracing::trace;

/// Piston that needs a fixed number of ticks to switch end positions.
///
/// While travelling it is neither extended nor retracted.
#[derive(Debug, Clone)]
pub struct SimulatedPiston {
    /// End position reached last.
    extended: bool,
    /// Remaining travel ticks (0 = at rest).
    ticks_until_change: u32,
    /// Full travel duration.
    travel_ticks: u32,
}

impl SimulatedPiston {
    /// Create an extended piston at rest.
    pub const fn new(travel_ticks: u32) -> Self {
        Self {
            extended: true,
            ticks_until_change: 0,
            travel_ticks,
        }
    }

    fn start_travel(&mut self) {
        if self.travel_ticks == 0 {
            self.extended = !self.extended;
        } else {
            self.ticks_until_change = self.travel_ticks;
        }
    }
}

impl Gripper for SimulatedPiston {
    fn extend(&mut self) {
        if !self.extended && self.ticks_until_change == 0 {
            self.start_travel();
        }
    }

    fn retract(&mut self) {
        if self.extended && self.ticks_until_change == 0 {
            self.start_travel();
        }
    }

    fn is_moving(&self) -> bool {
        self.ticks_until_change != 0
    }

    fn is_extended(&self) -> bool {
        self.ticks_until_change == 0 && self.extended
    }

    fn is_retracted(&self) -> bool {
        self.ticks_until_change == 0 && !self.extended
    }

    fn advance(&mut self) {
        if self.ticks_until_change > 0 {
            self.ticks_until_change -= 1;
            if self.ticks_until_change == 0 {
                self.extended = !self.extended;
                trace!(extended = self.extended, "piston settled");
            }
        }
    }
}

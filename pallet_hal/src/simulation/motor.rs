//! Constant-speed axis model.

use pallet_common::hal::driver::Axis;
use tracing::trace;

/// Axis that travels at most `speed` units towards its target each tick.
#[derive(Debug, Clone)]
pub struct SimulatedMotor {
    /// Target position from the last command.
    target_position: i64,
    /// Current position.
    position: i64,
    /// Travel per tick.
    speed: i64,
}

impl SimulatedMotor {
    /// Create a motor resting at 0.
    pub const fn new(speed: i64) -> Self {
        Self {
            target_position: 0,
            position: 0,
            speed,
        }
    }

    /// Current target.
    pub fn target_position(&self) -> i64 {
        self.target_position
    }
}

impl Axis for SimulatedMotor {
    fn command_position(&mut self, target: i64) {
        self.target_position = target;
    }

    fn is_moving(&self) -> bool {
        self.position != self.target_position
    }

    fn current_position(&self) -> i64 {
        self.position
    }

    fn stop(&mut self) {
        self.target_position = self.position;
    }

    fn advance(&mut self) {
        let diff = self.target_position - self.position;
        let step = diff.abs().min(self.speed);
        self.position += diff.signum() * step;
        trace!(position = self.position, target = self.target_position, "motor tick");
    }
}

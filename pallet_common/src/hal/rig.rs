//! The arm's hardware: three linear axes and a gripper.

use super::driver::{Axis, Gripper};
use crate::cell::geometry::Position;

/// Gripper condition as seen by telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripperStatus {
    Moving,
    Open,
    Closed,
}

impl GripperStatus {
    /// Short label for log lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Moving => "move",
            Self::Open => "open",
            Self::Closed => "clse",
        }
    }
}

/// Owned set of arm collaborators.
///
/// Built once at start-up; the boxed drivers are never replaced.
pub struct ArmRig {
    pub x: Box<dyn Axis>,
    pub y: Box<dyn Axis>,
    pub z: Box<dyn Axis>,
    pub gripper: Box<dyn Gripper>,
}

impl ArmRig {
    pub fn new(
        x: Box<dyn Axis>,
        y: Box<dyn Axis>,
        z: Box<dyn Axis>,
        gripper: Box<dyn Gripper>,
    ) -> Self {
        Self { x, y, z, gripper }
    }

    /// Advance every collaborator by one tick.
    pub fn advance(&mut self) {
        self.x.advance();
        self.y.advance();
        self.z.advance();
        self.gripper.advance();
    }

    /// Freeze all three axes where they are.
    pub fn stop_axes(&mut self) {
        self.x.stop();
        self.y.stop();
        self.z.stop();
    }

    /// Current (x, y, z) position.
    pub fn position(&self) -> Position {
        Position::new(
            self.x.current_position(),
            self.y.current_position(),
            self.z.current_position(),
        )
    }

    /// `[x, y, z]` moving flags.
    pub fn axes_moving(&self) -> [bool; 3] {
        [self.x.is_moving(), self.y.is_moving(), self.z.is_moving()]
    }

    pub fn gripper_status(&self) -> GripperStatus {
        if self.gripper.is_extended() {
            GripperStatus::Open
        } else if self.gripper.is_retracted() {
            GripperStatus::Closed
        } else {
            GripperStatus::Moving
        }
    }
}

impl std::fmt::Debug for ArmRig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmRig")
            .field("position", &self.position())
            .field("axes_moving", &self.axes_moving())
            .field("gripper", &self.gripper_status())
            .finish()
    }
}

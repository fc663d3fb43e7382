//! Published task states.
//!
//! Each task family owns exactly one of these enums and is its only writer.
//! The single exception is [`InletState`]: the arm clears it to
//! [`InletState::NoBox`] once it has taken the box.
//!
//! All enums are `#[repr(u8)]` with `Undefined = 0` as the start-up value.

use serde::{Deserialize, Serialize};

/// State published by the inlet conveyor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum InletState {
    /// Task has not run yet.
    #[default]
    Undefined = 0,
    /// Conveyor empty; box was taken.
    NoBox = 1,
    /// Box travelling towards the pickup position.
    MoveBox = 2,
    /// Box waiting at the pickup position.
    BoxReady = 3,
}

/// State published by the pallet magazine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MagazineState {
    /// Task has not run yet.
    #[default]
    Undefined = 0,
    /// A pallet with free slots is in place.
    Ready = 1,
    /// Full pallet is being swapped.
    Reloading = 2,
    /// No pallets left. Declared for telemetry consumers; never published.
    Empty = 3,
}

/// State published by the robot arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ArmState {
    /// Not referenced; set at start-up and after every error stop.
    #[default]
    Undefined = 0,
    /// Homing routine running.
    Homing = 1,
    /// Referenced and parked at the origin.
    InHomePos = 2,
    /// Moving to the wait position.
    ToWaitPos = 3,
    /// At the wait position, waiting for a box and a pallet.
    Waiting = 4,
    /// Moving to the pickup position and gripping.
    TakeBox = 5,
    /// Carrying a box to its stack slot.
    TransportBox = 6,
    /// Opening the gripper over the stack slot.
    ReleaseBox = 7,
}

impl ArmState {
    /// Whether the arm has a valid reference (homing finished).
    #[inline]
    pub const fn is_referenced(self) -> bool {
        !matches!(self, Self::Undefined | Self::Homing)
    }
}

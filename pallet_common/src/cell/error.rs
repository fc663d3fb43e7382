//! Process error kinds.
//!
//! Safety and process faults never travel as Rust errors. They are raised
//! and cleared on the settings gate, which keeps one flag per kind in an
//! [`ErrorFlags`] set. The catalogue is open-ended; the gate only relies on
//! the set/clear/count contract.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A recoverable process fault reported by the operator boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ErrorKind {
    /// Gripper reported a position it cannot be in.
    InvalidGripperPos = 0,
    /// Emergency stop circuit opened.
    EmergencyStop = 1,
    /// A box got caught on the inlet conveyor.
    BoxCaughtOnConveyor = 2,
}

impl ErrorKind {
    /// Every known kind, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::InvalidGripperPos,
        Self::EmergencyStop,
        Self::BoxCaughtOnConveyor,
    ];

    /// Number of distinct kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// The flag bit owned by this kind.
    #[inline]
    pub const fn flag(self) -> ErrorFlags {
        match self {
            Self::InvalidGripperPos => ErrorFlags::INVALID_GRIPPER_POS,
            Self::EmergencyStop => ErrorFlags::EMERGENCY_STOP,
            Self::BoxCaughtOnConveyor => ErrorFlags::BOX_CAUGHT_ON_CONVEYOR,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidGripperPos => "invalid_gripper_pos",
            Self::EmergencyStop => "emergency_stop",
            Self::BoxCaughtOnConveyor => "box_caught_on_conveyor",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Bounded set of currently raised [`ErrorKind`]s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ErrorFlags: u8 {
        const INVALID_GRIPPER_POS    = 1 << ErrorKind::InvalidGripperPos as u8;
        const EMERGENCY_STOP         = 1 << ErrorKind::EmergencyStop as u8;
        const BOX_CAUGHT_ON_CONVEYOR = 1 << ErrorKind::BoxCaughtOnConveyor as u8;
    }
}

impl Default for ErrorFlags {
    fn default() -> Self {
        Self::empty()
    }
}

static_assertions::const_assert!(ErrorKind::COUNT <= u8::BITS as usize);

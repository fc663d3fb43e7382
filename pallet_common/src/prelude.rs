//! Prelude module for common re-exports.
//!
//! ```rust
//! use pallet_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, Validate};
pub use crate::cell::config::{
    CycleConfig, InletConfig, MagazineConfig, OperatorAction, OperatorEvent,
    OperatorScriptConfig, PalletizerConfig, SimulationConfig, StackingConfig, TaskConfig,
};

// ─── Workcell ───────────────────────────────────────────────────────
pub use crate::cell::error::{ErrorFlags, ErrorKind};
pub use crate::cell::geometry::{Position, Slot};
pub use crate::cell::state::{ArmState, InletState, MagazineState};

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hal::driver::{Axis, Gripper};
pub use crate::hal::rig::{ArmRig, GripperStatus};

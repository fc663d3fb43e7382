//! Run configuration for the palletizer cell.
//!
//! Loaded once from TOML at start-up and immutable afterwards. Every section
//! and every field has a default equal to the reference cell, so an empty
//! document (or no document at all) yields a runnable configuration.
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! service_name = "palletizer-cell-01"
//!
//! [cycle]
//! period_us = 10000
//!
//! [stacking]
//! slots = [{ x = 250, y = 300 }, { x = 150, y = 300 }, { x = 250, y = 200 }, { x = 150, y = 200 }]
//! boxes_per_pallet = 48
//!
//! [[operator.events]]
//! tick = 0
//! action = "activate"
//!
//! [[operator.events]]
//! tick = 5
//! action = { raise = "emergency_stop" }
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig, Validate};
use crate::consts::{
    ARENA_UNIT_BYTES, BOX_HEIGHT, BOXES_PER_PALLET, FLOOR_HEIGHT, INLET_TRANSPORT_TICKS,
    MAGAZINE_RELOAD_TICKS, MAX_OPERATOR_EVENTS, MOTOR_SPEED, PISTON_TRAVEL_TICKS,
    STACK_SLOTS, TASK_ARENA_BYTES, TELEMETRY_INTERVAL_TICKS, TICK_PERIOD_US, TRAVEL_HEIGHT,
};

use super::error::ErrorKind;
use super::geometry::{Position, Slot, grid_slots};

/// Shortest accepted tick period [µs].
pub const PERIOD_US_MIN: u64 = 100;
/// Longest accepted tick period [µs].
pub const PERIOD_US_MAX: u64 = 1_000_000;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete palletizer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalletizerConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub stacking: StackingConfig,
    #[serde(default)]
    pub inlet: InletConfig,
    #[serde(default)]
    pub magazine: MagazineConfig,
    #[serde(default)]
    pub tasks: TaskConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub operator: OperatorScriptConfig,
}

impl Validate for PalletizerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.cycle.validate()?;
        self.stacking.validate()?;
        self.tasks.validate()?;
        self.simulation.validate()?;
        self.operator.validate()?;
        Ok(())
    }
}

// ─── Tick Loop ──────────────────────────────────────────────────────

/// Tick loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Tick period [µs] (default: 10000 = 10 ms).
    pub period_us: u64,
    /// Ticks between telemetry snapshots (default: 1).
    pub telemetry_interval: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            period_us: TICK_PERIOD_US,
            telemetry_interval: TELEMETRY_INTERVAL_TICKS,
        }
    }
}

impl CycleConfig {
    /// Tick period in nanoseconds.
    #[inline]
    pub const fn period_ns(&self) -> i64 {
        self.period_us as i64 * 1000
    }
}

impl Validate for CycleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.period_us < PERIOD_US_MIN || self.period_us > PERIOD_US_MAX {
            return Err(ConfigError::ValidationError(format!(
                "cycle.period_us {} out of range [{}, {}]",
                self.period_us, PERIOD_US_MIN, PERIOD_US_MAX
            )));
        }
        if self.telemetry_interval == 0 {
            return Err(ConfigError::ValidationError(
                "cycle.telemetry_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Stacking Geometry ──────────────────────────────────────────────

/// Arm positions and pallet geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackingConfig {
    /// The four (x, y) slots of one pallet layer.
    pub slots: [Slot; STACK_SLOTS],
    /// Where the arm waits for the next box.
    pub wait_pos: Position,
    /// Where the arm grips a box from the inlet.
    pub pickup_pos: Position,
    /// Height the arm lifts to before any horizontal move.
    pub travel_height: i64,
    /// Height of one box layer.
    pub box_height: i64,
    /// z coordinate of the lowest layer.
    pub floor_height: i64,
    /// Boxes that fit on one pallet.
    pub boxes_per_pallet: u64,
}

impl Default for StackingConfig {
    fn default() -> Self {
        Self {
            slots: grid_slots(250, 150, 300, 200),
            wait_pos: Position::new(100, 100, 100),
            pickup_pos: Position::new(100, 100, 200),
            travel_height: TRAVEL_HEIGHT,
            box_height: BOX_HEIGHT,
            floor_height: FLOOR_HEIGHT,
            boxes_per_pallet: BOXES_PER_PALLET,
        }
    }
}

impl StackingConfig {
    /// Target position for the box with 0-based index `index` on the pallet.
    ///
    /// Slots repeat every four boxes; each completed layer raises z by one
    /// box height.
    pub fn stack_position(&self, index: u64) -> Position {
        let slot = self.slots[(index % STACK_SLOTS as u64) as usize];
        let layer = (index / STACK_SLOTS as u64) as i64;
        slot.at_height(self.floor_height + layer * self.box_height)
    }
}

impl Validate for StackingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.boxes_per_pallet == 0 {
            return Err(ConfigError::ValidationError(
                "stacking.boxes_per_pallet must be at least 1".to_string(),
            ));
        }
        if self.box_height <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "stacking.box_height must be positive, got {}",
                self.box_height
            )));
        }
        Ok(())
    }
}

// ─── Task Families ──────────────────────────────────────────────────

/// Inlet conveyor timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InletConfig {
    /// Ticks spent in `MoveBox` before the box is ready.
    pub transport_ticks: u32,
}

impl Default for InletConfig {
    fn default() -> Self {
        Self {
            transport_ticks: INLET_TRANSPORT_TICKS,
        }
    }
}

/// Pallet magazine timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagazineConfig {
    /// Ticks spent in `Reloading` after a pallet is full.
    pub reload_ticks: u32,
}

impl Default for MagazineConfig {
    fn default() -> Self {
        Self {
            reload_ticks: MAGAZINE_RELOAD_TICKS,
        }
    }
}

/// Task runtime sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Frame arena capacity of each task family [bytes].
    pub arena_bytes: usize,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            arena_bytes: TASK_ARENA_BYTES,
        }
    }
}

impl Validate for TaskConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.arena_bytes < ARENA_UNIT_BYTES {
            return Err(ConfigError::ValidationError(format!(
                "tasks.arena_bytes {} below one arena unit ({ARENA_UNIT_BYTES})",
                self.arena_bytes
            )));
        }
        Ok(())
    }
}

// ─── Simulation ─────────────────────────────────────────────────────

/// Parameters of the simulated axes and gripper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Axis travel per tick [position units].
    pub motor_speed: i64,
    /// Gripper open/close duration [ticks].
    pub piston_travel_ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            motor_speed: MOTOR_SPEED,
            piston_travel_ticks: PISTON_TRAVEL_TICKS,
        }
    }
}

impl Validate for SimulationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.motor_speed <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "simulation.motor_speed must be positive, got {}",
                self.motor_speed
            )));
        }
        Ok(())
    }
}

// ─── Operator Script ────────────────────────────────────────────────

/// A call on the operator boundary of the settings gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorAction {
    Activate,
    Deactivate,
    Raise(ErrorKind),
    Clear(ErrorKind),
}

/// One scripted operator action, applied at the start of tick `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorEvent {
    pub tick: u64,
    pub action: OperatorAction,
}

/// Scripted operator input (the fault-injection boundary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorScriptConfig {
    pub events: Vec<OperatorEvent>,
}

impl Default for OperatorScriptConfig {
    /// The reference cell is switched on once, before the first tick.
    fn default() -> Self {
        Self {
            events: vec![OperatorEvent {
                tick: 0,
                action: OperatorAction::Activate,
            }],
        }
    }
}

impl Validate for OperatorScriptConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.events.len() > MAX_OPERATOR_EVENTS {
            return Err(ConfigError::ValidationError(format!(
                "operator.events has {} entries, at most {MAX_OPERATOR_EVENTS} allowed",
                self.events.len()
            )));
        }
        Ok(())
    }
}

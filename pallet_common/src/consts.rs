//! Reference constants.
//!
//! Every value here is the default of the corresponding configuration field,
//! so a run without a config file reproduces the reference cell.

/// Tick period in microseconds (10 ms).
pub const TICK_PERIOD_US: u64 = 10_000;

/// Ticks between two telemetry snapshots.
pub const TELEMETRY_INTERVAL_TICKS: u64 = 1;

/// Ticks the inlet conveyor needs to bring a box into the pickup position.
pub const INLET_TRANSPORT_TICKS: u32 = 10;

/// Ticks the magazine needs to swap a full pallet for an empty one.
pub const MAGAZINE_RELOAD_TICKS: u32 = 5;

/// Per-family frame arena capacity in bytes.
pub const TASK_ARENA_BYTES: usize = 512;

/// Arena allocation granularity in bytes.
pub const ARENA_UNIT_BYTES: usize = 16;

/// Deepest call tree any task family may build.
pub const MAX_CALL_DEPTH: usize = 8;

/// Maximum number of scripted operator events.
pub const MAX_OPERATOR_EVENTS: usize = 32;

/// Number of stacking slots per layer.
pub const STACK_SLOTS: usize = 4;

/// Simulated motor travel per tick [position units].
pub const MOTOR_SPEED: i64 = 55;

/// Simulated piston travel time [ticks].
pub const PISTON_TRAVEL_TICKS: u32 = 3;

/// Height the arm lifts to before any horizontal move.
pub const TRAVEL_HEIGHT: i64 = 100;

/// Height used for the homing lift.
pub const HOMING_TRAVEL_HEIGHT: i64 = 0;

/// Boxes per full pallet.
pub const BOXES_PER_PALLET: u64 = 48;

/// Height of one box layer.
pub const BOX_HEIGHT: i64 = 30;

/// z coordinate of the first box layer.
pub const FLOOR_HEIGHT: i64 = 300;

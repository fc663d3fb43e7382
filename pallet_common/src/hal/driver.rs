//! Axis and gripper traits.
//!
//! # Lifecycle
//!
//! 1. Commands (`command_position`, `extend`, `retract`, `stop`) only set a
//!    target; nothing moves until the next `advance()`.
//! 2. `advance()` is called exactly once per tick, before any task runs, so
//!    tasks always observe positions settled from the previous tick's
//!    commands.
//! 3. Queries are side-effect free.

/// A single positioning axis.
pub trait Axis: Send {
    /// Set a new target position.
    fn command_position(&mut self, target: i64);

    /// `true` while the axis has not reached its target.
    fn is_moving(&self) -> bool;

    /// Current position.
    fn current_position(&self) -> i64;

    /// Freeze the target at the current position.
    fn stop(&mut self);

    /// Advance the axis by one tick.
    fn advance(&mut self);
}

/// A two-position gripper (piston). Extended means open.
pub trait Gripper: Send {
    /// Start opening. No-op if already extended.
    fn extend(&mut self);

    /// Start closing. No-op if already retracted.
    fn retract(&mut self);

    /// `true` while the piston travels.
    fn is_moving(&self) -> bool;

    /// Settled in the extended end position.
    fn is_extended(&self) -> bool;

    /// Settled in the retracted end position.
    fn is_retracted(&self) -> bool;

    /// Advance the piston by one tick.
    fn advance(&mut self);
}

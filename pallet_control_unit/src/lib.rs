//! # Palletizer Control Unit Library
//!
//! Fixed-period control loop for a palletizing cell: a robot arm stacks
//! boxes from an inlet conveyor onto pallets supplied by a magazine.
//!
//! ## Cooperative Tasks
//!
//! Each subsystem is a perpetual [`task::CooperativeTask`]: an explicit
//! stack of resumable routine frames backed by a fixed-capacity LIFO
//! [`task::FrameArena`]. One `step()` makes exactly one unit of progress.
//! No threads, no locks, no allocation inside the loop.
//!
//! ## Choreography
//!
//! Tasks coordinate through the [`workcell::Workcell`]: every family
//! publishes one state enum and reads the others' one tick late. The
//! [`settings::Settings`] gate (active flag plus raised errors) is written
//! only by the [`operator`] boundary.
//!
//! ## Fault Channels
//!
//! 1. **Process errors**: raised/cleared on the settings gate, recoverable.
//! 2. **Contract violations**: [`error::TaskFault`] from `step()`, fatal.
//! 3. **Deadline overruns**: counted and logged, never fatal.

pub mod cycle;
pub mod error;
pub mod operator;
pub mod settings;
pub mod state;
pub mod task;
pub mod telemetry;
pub mod timer;
pub mod workcell;

//! # Palletizer HAL
//!
//! Simulated physical collaborators for the palletizer cell.
//!
//! The control unit only sees the [`Axis`] and [`Gripper`] traits from
//! `pallet_common::hal`; this crate supplies tick-driven models behind them.
//!
//! # Module Structure
//!
//! - [`simulation`] - `SimulatedMotor`, `SimulatedPiston` and the rig builder

#![deny(missing_docs)]

pub mod simulation;

pub use pallet_common::hal::driver::{Axis, Gripper};
pub use simulation::{SimulatedMotor, SimulatedPiston, simulated_rig};

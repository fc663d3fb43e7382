//! Workcell domain types.
//!
//! Everything the control unit, the simulated hardware and the telemetry
//! consumer have to agree on: geometry, error kinds, the states each task
//! publishes, and the immutable run configuration.

pub mod config;
pub mod error;
pub mod geometry;
pub mod state;

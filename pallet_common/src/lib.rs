//! Palletizer Common Library
//!
//! Shared definitions for all palletizer workspace crates.
//!
//! # Module Structure
//!
//! - [`cell`] - Workcell domain types: positions, error kinds, published task states,
//!   and the run configuration
//! - [`hal`] - Physical collaborator traits (axes, gripper) and the arm rig
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Reference constants used as configuration defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use pallet_common::prelude::*;
//!
//! let config = PalletizerConfig::default();
//! assert_eq!(config.stacking.boxes_per_pallet, 48);
//! ```

pub mod cell;
pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;

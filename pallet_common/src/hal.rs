//! Physical collaborator interfaces.
//!
//! The control unit only ever talks to hardware through these traits. The
//! `pallet_hal` crate provides simulated implementations.

pub mod driver;
pub mod rig;

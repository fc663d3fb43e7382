//! Cooperative task root.
//!
//! Frame arena, resumable routines, and the stepped call-stack driver.

pub mod arena;
pub mod cooperative;
pub mod routine;

pub use arena::{FrameAddr, FrameArena};
pub use cooperative::{CooperativeTask, TaskStatus};
pub use routine::{Flow, Routine, Step};

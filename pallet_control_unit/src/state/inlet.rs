//! Inlet conveyor task.
//!
//! Waits for activation, transports a box for `transport_ticks` ticks, then
//! holds it in `BoxReady` until the arm takes it.

use pallet_common::prelude::InletState;
use tracing::debug;

use crate::error::TaskFault;
use crate::task::{CooperativeTask, Flow, FrameArena, Routine};
use crate::wait_while;
use crate::workcell::InletCtx;

/// Task family name.
pub const NAME: &str = "Inlet";

/// Arena bytes of the family's single frame.
pub const ARENA_BYTES: usize = FrameArena::rounded(core::mem::size_of::<InletConveyor>());

pub type InletTask = CooperativeTask<InletConveyor>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Start,
    AwaitActive,
    Transport,
    AwaitPickup,
}

/// The inlet's single, perpetual routine.
#[derive(Debug, Clone)]
pub struct InletConveyor {
    label: Label,
    ticks_left: u32,
}

impl InletConveyor {
    pub const fn new() -> Self {
        Self {
            label: Label::Start,
            ticks_left: 0,
        }
    }
}

impl Default for InletConveyor {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Routine<InletCtx<'a>> for InletConveyor {
    fn resume(&mut self, ctx: &mut InletCtx<'a>) -> Result<Flow<Self>, TaskFault> {
        loop {
            match self.label {
                Label::Start => {
                    if *ctx.state != InletState::Undefined {
                        return Err(TaskFault::Precondition {
                            task: NAME,
                            detail: "inlet state must be Undefined at start",
                        });
                    }
                    self.label = Label::AwaitActive;
                }
                Label::AwaitActive => {
                    wait_while!(!ctx.settings.is_active());
                    *ctx.state = InletState::MoveBox;
                    debug!(task = NAME, "box on its way");
                    self.ticks_left = ctx.transport_ticks;
                    self.label = Label::Transport;
                }
                Label::Transport => {
                    if self.ticks_left > 0 {
                        self.ticks_left -= 1;
                        return Ok(Flow::Yield);
                    }
                    *ctx.state = InletState::BoxReady;
                    self.label = Label::AwaitPickup;
                }
                Label::AwaitPickup => {
                    wait_while!(*ctx.state == InletState::BoxReady);
                    self.label = Label::AwaitActive;
                }
            }
        }
    }
}

/// Create the inlet task.
///
/// # Errors
/// [`TaskFault::Arena`] if `arena_bytes` cannot hold the root frame.
pub fn inlet_task(arena_bytes: usize) -> Result<InletTask, TaskFault> {
    CooperativeTask::new(NAME, InletConveyor::new(), arena_bytes)
}

//! Pallet magazine task.
//!
//! Publishes `Ready` until the pallet holds `capacity` boxes, then swaps the
//! pallet: `Reloading`, box counter reset, `reload_ticks` ticks of waiting,
//! `Ready` again.

use pallet_common::prelude::MagazineState;
use tracing::info;

use crate::error::TaskFault;
use crate::task::{CooperativeTask, Flow, FrameArena, Routine};
use crate::wait_while;
use crate::workcell::MagazineCtx;

/// Task family name.
pub const NAME: &str = "Magazine";

/// Arena bytes of the family's single frame.
pub const ARENA_BYTES: usize = FrameArena::rounded(core::mem::size_of::<PalletMagazine>());

pub type MagazineTask = CooperativeTask<PalletMagazine>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Start,
    Publish,
    AwaitFull,
    Reload,
}

/// The magazine's single, perpetual routine.
#[derive(Debug, Clone)]
pub struct PalletMagazine {
    label: Label,
    ticks_left: u32,
}

impl PalletMagazine {
    pub const fn new() -> Self {
        Self {
            label: Label::Start,
            ticks_left: 0,
        }
    }
}

impl Default for PalletMagazine {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Routine<MagazineCtx<'a>> for PalletMagazine {
    fn resume(&mut self, ctx: &mut MagazineCtx<'a>) -> Result<Flow<Self>, TaskFault> {
        loop {
            match self.label {
                Label::Start => {
                    if *ctx.state != MagazineState::Undefined {
                        return Err(TaskFault::Precondition {
                            task: NAME,
                            detail: "magazine state must be Undefined at start",
                        });
                    }
                    self.label = Label::Publish;
                }
                Label::Publish => {
                    *ctx.state = MagazineState::Ready;
                    self.label = Label::AwaitFull;
                }
                Label::AwaitFull => {
                    wait_while!(ctx.boxes.count() < ctx.capacity);
                    *ctx.state = MagazineState::Reloading;
                    ctx.boxes.reset();
                    info!(
                        task = NAME,
                        pallets = ctx.boxes.pallets(),
                        "pallet full, reloading"
                    );
                    self.ticks_left = ctx.reload_ticks;
                    self.label = Label::Reload;
                }
                Label::Reload => {
                    if self.ticks_left > 0 {
                        self.ticks_left -= 1;
                        return Ok(Flow::Yield);
                    }
                    self.label = Label::Publish;
                }
            }
        }
    }
}

/// Create the magazine task.
///
/// # Errors
/// [`TaskFault::Arena`] if `arena_bytes` cannot hold the root frame.
pub fn magazine_task(arena_bytes: usize) -> Result<MagazineTask, TaskFault> {
    CooperativeTask::new(NAME, PalletMagazine::new(), arena_bytes)
}

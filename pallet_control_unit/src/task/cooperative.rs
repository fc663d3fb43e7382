//! Stepped execution of a routine call tree.
//!
//! A [`CooperativeTask`] owns the call stack of one task family: the frames
//! of the routines currently live (root first) and the family's
//! [`FrameArena`]. Each `step()` walks the stack from the root down:
//!
//! 1. A frame parked on a child first checks whether the child finished on
//!    the previous step or the frame's guard dropped. Either way the child
//!    subtree is popped (top first) and the frame itself resumes.
//! 2. Otherwise the walk descends into the child.
//! 3. The frame reached last is resumed. `Yield` ends the step, `Exec`
//!    pushes a child and keeps walking, `Return` marks the frame finished
//!    and ends the step (the root returning completes the task).
//!
//! So exactly one unit of progress happens per step, and a parent sees its
//! child's completion one step later, matching a yield after every child
//! step.

use core::mem::size_of;

use heapless::Vec;
use pallet_common::consts::MAX_CALL_DEPTH;
use tracing::{debug, trace};

use super::arena::{FrameAddr, FrameArena};
use super::routine::{Flow, Routine, Step};
use crate::error::TaskFault;

/// Liveness of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Further `step()` calls make progress.
    Alive,
    /// The root routine returned.
    Completed,
    /// A fault escaped `step()`; the call tree has been released.
    Faulted,
}

#[derive(Debug)]
struct Frame<F> {
    addr: FrameAddr,
    routine: F,
    /// Returned on an earlier step; waiting for the parent to reap it.
    finished: bool,
}

/// A resumable task built from frames of type `F`.
#[derive(Debug)]
pub struct CooperativeTask<F> {
    name: &'static str,
    arena: FrameArena,
    frames: Vec<Frame<F>, MAX_CALL_DEPTH>,
    status: TaskStatus,
    steps: u64,
}

impl<F> CooperativeTask<F> {
    /// Create a task whose root routine is `root`.
    ///
    /// Nothing runs until the first `step()`.
    ///
    /// # Errors
    /// [`TaskFault::Arena`] if the arena cannot hold even the root frame.
    pub fn new(name: &'static str, root: F, arena_bytes: usize) -> Result<Self, TaskFault> {
        let mut task = Self {
            name,
            arena: FrameArena::new(arena_bytes),
            frames: Vec::new(),
            status: TaskStatus::Alive,
            steps: 0,
        };
        task.push(root)?;
        debug!(
            task = name,
            frame_bytes = FrameArena::rounded(size_of::<F>()),
            arena_bytes,
            "task created"
        );
        Ok(task)
    }

    /// Task family name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Current liveness.
    #[inline]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Whether further `step()` calls are meaningful.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.status == TaskStatus::Alive
    }

    /// Number of live frames (root included).
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Successful steps so far.
    #[inline]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// The family's arena, for diagnostics.
    #[inline]
    pub const fn arena(&self) -> &FrameArena {
        &self.arena
    }

    /// Arena addresses of the live frames, root first.
    pub fn frame_addrs(&self) -> impl Iterator<Item = FrameAddr> + '_ {
        self.frames.iter().map(|frame| frame.addr)
    }

    /// The root routine, while the task is alive.
    pub fn root(&self) -> Option<&F> {
        self.frames.first().map(|frame| &frame.routine)
    }

    /// Advance the task by one step.
    ///
    /// # Errors
    /// [`TaskFault::NotAlive`] if the task already completed or faulted;
    /// otherwise whatever fault the routines or the arena raised during
    /// this step. After an error the task is `Faulted`.
    pub fn step<C>(&mut self, ctx: &mut C) -> Result<Step, TaskFault>
    where
        F: Routine<C>,
    {
        if self.status != TaskStatus::Alive {
            return Err(TaskFault::NotAlive { task: self.name });
        }

        match self.advance(ctx) {
            Ok(step) => {
                self.steps += 1;
                if step == Step::Completed {
                    self.status = TaskStatus::Completed;
                    debug!(task = self.name, steps = self.steps, "task completed");
                }
                Ok(step)
            }
            Err(fault) => {
                self.status = TaskStatus::Faulted;
                self.release_all();
                Err(fault)
            }
        }
    }

    fn advance<C>(&mut self, ctx: &mut C) -> Result<Step, TaskFault>
    where
        F: Routine<C>,
    {
        let mut depth = 0;
        loop {
            if depth + 1 < self.frames.len() {
                let child_finished = self.frames[depth + 1].finished;
                if child_finished || !self.frames[depth].routine.guard(ctx) {
                    trace!(task = self.name, depth, child_finished, "leaving child");
                    self.unwind_to(depth)?;
                } else {
                    depth += 1;
                    continue;
                }
            }

            match self.frames[depth].routine.resume(ctx)? {
                Flow::Yield => return Ok(Step::Suspended),
                Flow::Exec(child) => {
                    self.push(child)?;
                    trace!(task = self.name, depth = depth + 1, "entered child");
                }
                Flow::Return if depth == 0 => {
                    self.pop()?;
                    return Ok(Step::Completed);
                }
                Flow::Return => {
                    self.frames[depth].finished = true;
                    return Ok(Step::Suspended);
                }
            }
        }
    }

    fn push(&mut self, routine: F) -> Result<(), TaskFault> {
        if self.frames.is_full() {
            return Err(TaskFault::CallDepthExceeded {
                task: self.name,
                max_depth: MAX_CALL_DEPTH,
            });
        }
        let addr = self
            .arena
            .allocate(size_of::<F>())
            .map_err(|source| TaskFault::Arena {
                task: self.name,
                source,
            })?;
        // Cannot fail: fullness checked above.
        let _ = self.frames.push(Frame {
            addr,
            routine,
            finished: false,
        });
        Ok(())
    }

    fn pop(&mut self) -> Result<(), TaskFault> {
        if let Some(frame) = self.frames.pop() {
            self.arena
                .deallocate(frame.addr)
                .map_err(|source| TaskFault::Arena {
                    task: self.name,
                    source,
                })?;
        }
        Ok(())
    }

    /// Pop every frame above `depth`, top first.
    fn unwind_to(&mut self, depth: usize) -> Result<(), TaskFault> {
        while self.frames.len() > depth + 1 {
            self.pop()?;
        }
        Ok(())
    }

    fn release_all(&mut self) {
        while let Some(frame) = self.frames.pop() {
            // Already faulted; a second arena error adds nothing.
            let _ = self.arena.deallocate(frame.addr);
        }
    }
}

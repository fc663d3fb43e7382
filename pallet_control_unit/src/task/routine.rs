//! Resumable routines: the building block of cooperative tasks.
//!
//! A routine is an explicit state value (usually an enum of labels) whose
//! [`Routine::resume`] runs from the current label up to the next suspension
//! point and reports what happened as a [`Flow`]:
//!
//! - [`Flow::Yield`] ends the current step (`wait_while` and plain yields).
//! - [`Flow::Exec`] starts a sub-routine. The caller sets its own label to
//!   the continuation before returning it. The child runs in the same step;
//!   the parent resumes at the continuation once the child is finished.
//! - [`Flow::Return`] finishes the routine.
//!
//! `exec_while` is `Flow::Exec` plus [`Routine::guard`]: while the parent is
//! parked on a child, the guard is evaluated before every child step
//! (including the first). Once it is false the child subtree is abandoned
//! and the parent resumes at its continuation in that same step.

use crate::error::TaskFault;

/// What a single `resume` call ended with.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow<F> {
    /// Suspension point reached; the task step is over.
    Yield,
    /// Run a child routine to completion (or until the guard drops).
    Exec(F),
    /// The routine is finished.
    Return,
}

/// Outcome of one `CooperativeTask::step()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The task yielded and is waiting for the next tick.
    Suspended,
    /// The root routine returned; the task is no longer alive.
    Completed,
}

/// One frame type of a task family, resumable against context `C`.
///
/// A family uses a single frame type (typically an enum over all its
/// routines) so every frame of its call tree has the same footprint in the
/// family's arena.
pub trait Routine<C>: Sized {
    /// Run from the current label to the next suspension point.
    ///
    /// # Errors
    /// A [`TaskFault`] aborts the whole task and is returned from `step()`.
    fn resume(&mut self, ctx: &mut C) -> Result<Flow<Self>, TaskFault>;

    /// Keep stepping the child this frame is parked on?
    ///
    /// Only consulted while a child is live. The default (`true`) gives
    /// plain `exec` semantics.
    fn guard(&self, _ctx: &C) -> bool {
        true
    }
}

/// Suspend the current step while `$blocked` holds.
///
/// Expands to an early `return Ok(Flow::Yield)`. Because `resume` is
/// re-entered at the same label on the next step, the condition is
/// evaluated fresh every tick and execution falls through in the same step
/// as soon as it is false.
#[macro_export]
macro_rules! wait_while {
    ($blocked:expr) => {
        if $blocked {
            return Ok($crate::task::routine::Flow::Yield);
        }
    };
}

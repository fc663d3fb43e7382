//! Contract-violation faults.
//!
//! These are the fatal channel: they surface synchronously from
//! `CooperativeTask::step()`, abort the tick loop and end the process.
//! Recoverable process faults never appear here; they live in the settings
//! gate as raised `ErrorKind`s.

use thiserror::Error;

/// Frame arena contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// Allocation would exceed the arena capacity (or its block table).
    #[error("arena exhausted: requested {requested} bytes, {available} of {capacity} free")]
    Exhausted {
        requested: usize,
        available: usize,
        capacity: usize,
    },

    /// A block other than the most recently allocated one was freed.
    #[error("LIFO violation: freed block at offset {freed}, top of arena is {top}")]
    OutOfOrder { freed: usize, top: usize },

    /// Free on an arena with no live blocks.
    #[error("free of block at offset {freed} on an empty arena")]
    Empty { freed: usize },
}

/// A fault escaping a task's `step()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskFault {
    /// The task family's frame arena rejected an allocation or free.
    #[error("task '{task}': {source}")]
    Arena {
        task: &'static str,
        #[source]
        source: ArenaError,
    },

    /// `step()` called on a task that already completed or faulted.
    #[error("task '{task}' stepped while not alive")]
    NotAlive { task: &'static str },

    /// Call tree deeper than the configured maximum.
    #[error("task '{task}' exceeded maximum call depth {max_depth}")]
    CallDepthExceeded {
        task: &'static str,
        max_depth: usize,
    },

    /// A routine found the world in a state it must never observe.
    #[error("task '{task}' precondition failed: {detail}")]
    Precondition {
        task: &'static str,
        detail: &'static str,
    },
}

impl TaskFault {
    /// Name of the task family the fault originated in.
    pub const fn task(&self) -> &'static str {
        match self {
            Self::Arena { task, .. }
            | Self::NotAlive { task }
            | Self::CallDepthExceeded { task, .. }
            | Self::Precondition { task, .. } => task,
        }
    }
}

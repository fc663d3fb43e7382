//! Robot arm task.
//!
//! The arm family nests up to three routines deep:
//!
//! ```text
//! Supervisor ─┬─ exec_while(!has_error) ─ Homing ─── exec ─ GoTo
//!             └─ exec_while(!has_error) ─ StackingCycle ─ exec ─ GoTo
//! ```
//!
//! The supervisor is the perpetual root. It homes the arm, idles while the
//! cell is inactive and runs stacking cycles while it is active. Any raised
//! error abandons the running child, stops all axes and resets the arm to
//! `Undefined`, after which it homes again once the errors are cleared.
//! Homing also reopens the gripper, so a box held at the error stop is
//! dropped before the next cycle.

use pallet_common::consts::{HOMING_TRAVEL_HEIGHT, TASK_ARENA_BYTES};
use pallet_common::prelude::{ArmState, InletState, MagazineState, Position};
use tracing::{debug, info, warn};

use crate::error::TaskFault;
use crate::task::{CooperativeTask, FrameArena, Flow, Routine};
use crate::wait_while;
use crate::workcell::ArmCtx;

/// Task family name.
pub const NAME: &str = "Arm";

/// Deepest arm call tree: supervisor, cycle, move.
pub const MAX_DEPTH: usize = 3;

pub type ArmTask = CooperativeTask<ArmFrame>;

/// Every routine of the arm family.
#[derive(Debug, Clone)]
pub enum ArmFrame {
    Supervisor(Supervisor),
    Homing(Homing),
    Cycle(StackingCycle),
    GoTo(GoTo),
}

/// Arena bytes the deepest arm call tree occupies.
pub const ARENA_BYTES: usize = FrameArena::rounded(core::mem::size_of::<ArmFrame>()) * MAX_DEPTH;

static_assertions::const_assert!(ARENA_BYTES <= TASK_ARENA_BYTES);

impl<'a> Routine<ArmCtx<'a>> for ArmFrame {
    fn resume(&mut self, ctx: &mut ArmCtx<'a>) -> Result<Flow<Self>, TaskFault> {
        match self {
            Self::Supervisor(routine) => routine.resume(ctx),
            Self::Homing(routine) => routine.resume(ctx),
            Self::Cycle(routine) => routine.resume(ctx),
            Self::GoTo(routine) => routine.resume(ctx),
        }
    }

    fn guard(&self, ctx: &ArmCtx<'a>) -> bool {
        match self {
            Self::Supervisor(routine) => routine.guard(ctx),
            _ => true,
        }
    }
}

/// Create the arm task with a fresh supervisor as root.
///
/// # Errors
/// [`TaskFault::Arena`] if `arena_bytes` cannot hold the root frame.
pub fn arm_task(arena_bytes: usize) -> Result<ArmTask, TaskFault> {
    CooperativeTask::new(NAME, ArmFrame::Supervisor(Supervisor::new()), arena_bytes)
}

fn precondition(holds: bool, detail: &'static str) -> Result<(), TaskFault> {
    if holds {
        Ok(())
    } else {
        Err(TaskFault::Precondition { task: NAME, detail })
    }
}

// ─── Supervisor ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SupervisorLabel {
    /// Loop head.
    Start,
    /// Wait for all errors to clear, then home.
    AwaitClear,
    /// Homing finished or abandoned.
    Homed,
    /// Idle or start the next cycle.
    Supervise,
    /// Stacking cycle finished or abandoned.
    Cycling,
    /// Error branch.
    Halt,
}

/// Perpetual root routine of the arm.
#[derive(Debug, Clone)]
pub struct Supervisor {
    label: SupervisorLabel,
}

impl Supervisor {
    pub const fn new() -> Self {
        Self {
            label: SupervisorLabel::Start,
        }
    }

    fn resume(&mut self, ctx: &mut ArmCtx<'_>) -> Result<Flow<ArmFrame>, TaskFault> {
        loop {
            match self.label {
                SupervisorLabel::Start => {
                    precondition(
                        *ctx.state == ArmState::Undefined,
                        "arm state must be Undefined at loop head",
                    )?;
                    self.label = SupervisorLabel::AwaitClear;
                }
                SupervisorLabel::AwaitClear => {
                    wait_while!(ctx.settings.has_error());
                    ctx.publish(ArmState::Homing);
                    info!(task = NAME, "homing");
                    self.label = SupervisorLabel::Homed;
                    return Ok(Flow::Exec(ArmFrame::Homing(Homing::new())));
                }
                SupervisorLabel::Homed | SupervisorLabel::Cycling => {
                    self.label = SupervisorLabel::Supervise;
                }
                SupervisorLabel::Supervise => {
                    if ctx.settings.has_error() {
                        self.label = SupervisorLabel::Halt;
                        continue;
                    }
                    wait_while!(!ctx.settings.is_active());
                    self.label = SupervisorLabel::Cycling;
                    return Ok(Flow::Exec(ArmFrame::Cycle(StackingCycle::new())));
                }
                SupervisorLabel::Halt => {
                    ctx.rig.stop_axes();
                    ctx.publish(ArmState::Undefined);
                    warn!(
                        task = NAME,
                        errors = ctx.settings.error_count(),
                        position = ?ctx.rig.position(),
                        "error stop, axes halted"
                    );
                    self.label = SupervisorLabel::Start;
                }
            }
        }
    }

    /// `exec_while(!has_error, ..)` for both homing and stacking.
    fn guard(&self, ctx: &ArmCtx<'_>) -> bool {
        !ctx.settings.has_error()
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Homing ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HomingLabel {
    Start,
    Finish,
}

/// Drive all axes to the zero reference and open the gripper.
#[derive(Debug, Clone)]
pub struct Homing {
    label: HomingLabel,
}

impl Homing {
    pub const fn new() -> Self {
        Self {
            label: HomingLabel::Start,
        }
    }

    fn resume(&mut self, ctx: &mut ArmCtx<'_>) -> Result<Flow<ArmFrame>, TaskFault> {
        match self.label {
            HomingLabel::Start => {
                precondition(
                    *ctx.state == ArmState::Homing,
                    "homing started outside Homing state",
                )?;
                self.label = HomingLabel::Finish;
                Ok(Flow::Exec(ArmFrame::GoTo(GoTo::new(
                    HOMING_TRAVEL_HEIGHT,
                    Position::ORIGIN,
                ))))
            }
            HomingLabel::Finish => {
                // An error stop can leave the gripper closed on a box.
                ctx.rig.gripper.extend();
                wait_while!(!ctx.rig.gripper.is_extended());
                ctx.publish(ArmState::InHomePos);
                info!(task = NAME, "in home position");
                Ok(Flow::Return)
            }
        }
    }
}

impl Default for Homing {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stacking Cycle ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleLabel {
    Start,
    AtWaitPos,
    /// First pass of the wait loop: always yields once.
    WaitGate,
    /// Later passes: leave once a box and a pallet are ready.
    WaitCheck,
    AtPickup,
    Gripping,
    AtStack,
    Releasing,
    Parked,
}

/// Take one box from the inlet and put it on the pallet.
#[derive(Debug, Clone)]
pub struct StackingCycle {
    label: CycleLabel,
}

impl StackingCycle {
    pub const fn new() -> Self {
        Self {
            label: CycleLabel::Start,
        }
    }

    fn go_to(ctx: &ArmCtx<'_>, target: Position) -> Flow<ArmFrame> {
        Flow::Exec(ArmFrame::GoTo(GoTo::new(ctx.stacking.travel_height, target)))
    }

    fn resume(&mut self, ctx: &mut ArmCtx<'_>) -> Result<Flow<ArmFrame>, TaskFault> {
        loop {
            match self.label {
                CycleLabel::Start => {
                    precondition(
                        ctx.state.is_referenced() && ctx.rig.gripper.is_extended(),
                        "stacking cycle needs a referenced arm with extended gripper",
                    )?;
                    ctx.publish(ArmState::ToWaitPos);
                    self.label = CycleLabel::AtWaitPos;
                    return Ok(Self::go_to(ctx, ctx.stacking.wait_pos));
                }
                CycleLabel::AtWaitPos => {
                    ctx.publish(ArmState::Waiting);
                    self.label = CycleLabel::WaitGate;
                }
                CycleLabel::WaitGate => {
                    if !ctx.settings.is_active() {
                        debug!(task = NAME, "deactivated while waiting, cycle aborted");
                        return Ok(Flow::Return);
                    }
                    self.label = CycleLabel::WaitCheck;
                    return Ok(Flow::Yield);
                }
                CycleLabel::WaitCheck => {
                    if ctx.inlet.state() != InletState::BoxReady
                        || ctx.magazine != MagazineState::Ready
                    {
                        self.label = CycleLabel::WaitGate;
                        continue;
                    }
                    ctx.publish(ArmState::TakeBox);
                    precondition(
                        ctx.rig.gripper.is_extended(),
                        "gripper must be extended before pickup",
                    )?;
                    self.label = CycleLabel::AtPickup;
                    return Ok(Self::go_to(ctx, ctx.stacking.pickup_pos));
                }
                CycleLabel::AtPickup => {
                    ctx.rig.gripper.retract();
                    self.label = CycleLabel::Gripping;
                }
                CycleLabel::Gripping => {
                    wait_while!(!ctx.rig.gripper.is_retracted());
                    ctx.inlet.take_box();
                    ctx.publish(ArmState::TransportBox);
                    let target = ctx.stacking.stack_position(ctx.boxes.count());
                    debug!(task = NAME, index = ctx.boxes.count(), ?target, "box taken");
                    self.label = CycleLabel::AtStack;
                    return Ok(Self::go_to(ctx, target));
                }
                CycleLabel::AtStack => {
                    ctx.publish(ArmState::ReleaseBox);
                    ctx.rig.gripper.extend();
                    self.label = CycleLabel::Releasing;
                }
                CycleLabel::Releasing => {
                    wait_while!(!ctx.rig.gripper.is_extended());
                    ctx.boxes.increment();
                    debug!(task = NAME, nr_boxes = ctx.boxes.count(), "box released");
                    ctx.publish(ArmState::ToWaitPos);
                    self.label = CycleLabel::Parked;
                    return Ok(Self::go_to(ctx, ctx.stacking.wait_pos));
                }
                CycleLabel::Parked => {
                    ctx.publish(ArmState::Waiting);
                    return Ok(Flow::Return);
                }
            }
        }
    }
}

impl Default for StackingCycle {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Lift-then-traverse move ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GoToLabel {
    Start,
    Lifting,
    Traversing,
    Descending,
}

/// Move to `target`: z to `travel_z`, then x and y together, then z to
/// `target.z`. Each leg waits for its axes to settle.
#[derive(Debug, Clone)]
pub struct GoTo {
    label: GoToLabel,
    travel_z: i64,
    target: Position,
}

impl GoTo {
    pub const fn new(travel_z: i64, target: Position) -> Self {
        Self {
            label: GoToLabel::Start,
            travel_z,
            target,
        }
    }

    fn resume(&mut self, ctx: &mut ArmCtx<'_>) -> Result<Flow<ArmFrame>, TaskFault> {
        loop {
            match self.label {
                GoToLabel::Start => {
                    ctx.rig.z.command_position(self.travel_z);
                    self.label = GoToLabel::Lifting;
                }
                GoToLabel::Lifting => {
                    wait_while!(ctx.rig.z.is_moving());
                    ctx.rig.x.command_position(self.target.x);
                    ctx.rig.y.command_position(self.target.y);
                    self.label = GoToLabel::Traversing;
                }
                GoToLabel::Traversing => {
                    wait_while!(ctx.rig.x.is_moving() || ctx.rig.y.is_moving());
                    ctx.rig.z.command_position(self.target.z);
                    self.label = GoToLabel::Descending;
                }
                GoToLabel::Descending => {
                    wait_while!(ctx.rig.z.is_moving());
                    return Ok(Flow::Return);
                }
            }
        }
    }
}

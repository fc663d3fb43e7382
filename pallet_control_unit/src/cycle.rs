//! Fixed-period tick loop.
//!
//! ## RT Setup
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`: RT priority.
//!
//! All four are no-ops without the `rt` feature.
//!
//! ## Tick Body
//! 0. Apply operator events due this tick.
//! 1. Advance the physical collaborators one step.
//! 2. Step Arm, Magazine, Inlet, exactly once each, in that order.
//! 3. Sleep out the period (overrun: warn, count, resync).
//! 4. Telemetry every `telemetry_interval` ticks.
//!
//! A fault escaping any task step aborts the loop immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pallet_common::prelude::{ArmRig, ConfigError, PalletizerConfig};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::TaskFault;
use crate::operator::OperatorScript;
use crate::state::{
    ArmTask, InletTask, MagazineTask, arm, arm_task, inlet, inlet_task, magazine, magazine_task,
};
use crate::telemetry::{Telemetry, report_overrun};
use crate::timer::{Clock, TickSlack, TickTimer};
use crate::workcell::Workcell;

// ─── Tick Statistics ────────────────────────────────────────────────

/// O(1) per-tick timing statistics.
///
/// Tracks the processing time of the tick body (before the end-of-tick
/// wait), not the full period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    /// Ticks executed.
    pub tick_count: u64,
    /// Last tick processing time [ns].
    pub last_tick_ns: i64,
    /// Minimum processing time [ns].
    pub min_tick_ns: i64,
    /// Maximum processing time [ns].
    pub max_tick_ns: i64,
    /// Running sum for the average.
    pub sum_tick_ns: i64,
    /// Ticks whose period budget was used up.
    pub overruns: u64,
}

impl TickStats {
    pub const fn new() -> Self {
        Self {
            tick_count: 0,
            last_tick_ns: 0,
            min_tick_ns: i64::MAX,
            max_tick_ns: 0,
            sum_tick_ns: 0,
            overruns: 0,
        }
    }

    /// Record one tick. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, overrun: bool) {
        self.tick_count += 1;
        self.last_tick_ns = duration_ns;
        self.min_tick_ns = self.min_tick_ns.min(duration_ns);
        self.max_tick_ns = self.max_tick_ns.max(duration_ns);
        self.sum_tick_ns = self.sum_tick_ns.saturating_add(duration_ns);
        if overrun {
            self.overruns += 1;
        }
    }

    /// Average processing time [ns] (0 before the first tick).
    #[inline]
    pub fn avg_tick_ns(&self) -> i64 {
        if self.tick_count == 0 {
            0
        } else {
            self.sum_tick_ns / self.tick_count as i64
        }
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors & RT Setup ──────────────────────────────────────────────

/// Errors that end the tick loop.
#[derive(Debug, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),

    /// Runtime configuration rejected while building the scheduler.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A task broke its contract.
    #[error(transparent)]
    Task(#[from] TaskFault),
}

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the loop never page-faults on it.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let buf = [0xA5u8; 256 * 1024];
    core::hint::black_box(&buf);
}

#[cfg(not(feature = "rt"))]
fn prefault_stack() {}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: pid 0 is the calling thread; `param` outlives the call.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Perform the RT setup sequence. Call once before the first tick.
///
/// # Errors
/// [`CycleError::RtSetup`] if any system call fails (`rt` feature only).
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Scheduler ──────────────────────────────────────────────────────

/// What a finished run accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub boxes_stacked: u64,
    pub pallets_completed: u64,
    pub overruns: u64,
    pub stats: TickStats,
}

/// Reject arenas that cannot hold every family's deepest call tree.
fn check_arena(arena_bytes: usize) -> Result<(), ConfigError> {
    let families = [
        (arm::NAME, arm::ARENA_BYTES),
        (magazine::NAME, magazine::ARENA_BYTES),
        (inlet::NAME, inlet::ARENA_BYTES),
    ];
    for (task, needed) in families {
        if arena_bytes < needed {
            return Err(ConfigError::ValidationError(format!(
                "tasks.arena_bytes {arena_bytes} too small: {task} needs {needed}"
            )));
        }
    }
    Ok(())
}

/// Owns the workcell, the three tasks and the pacing timer.
#[derive(Debug)]
pub struct TickScheduler<K: Clock> {
    cell: Workcell,
    arm: ArmTask,
    magazine: MagazineTask,
    inlet: InletTask,
    operator: OperatorScript,
    timer: TickTimer<K>,
    stats: TickStats,
    telemetry_interval: u64,
    tick: u64,
    last_telemetry: Option<Telemetry>,
}

impl<K: Clock> TickScheduler<K> {
    /// Build the cell and its tasks. The first period starts now.
    ///
    /// # Errors
    /// [`CycleError::Config`] for an unusable operator script or an arena
    /// too small for the deepest call tree of any task family.
    pub fn new(config: &PalletizerConfig, rig: ArmRig, clock: K) -> Result<Self, CycleError> {
        let arena_bytes = config.tasks.arena_bytes;
        check_arena(arena_bytes)?;
        let scheduler = Self {
            cell: Workcell::new(config, rig),
            arm: arm_task(arena_bytes)?,
            magazine: magazine_task(arena_bytes)?,
            inlet: inlet_task(arena_bytes)?,
            operator: OperatorScript::new(&config.operator.events)?,
            timer: TickTimer::new(clock, Duration::from_micros(config.cycle.period_us)),
            stats: TickStats::new(),
            telemetry_interval: config.cycle.telemetry_interval.max(1),
            tick: 0,
            last_telemetry: None,
        };
        debug!(
            period_us = config.cycle.period_us,
            arena_bytes,
            operator_events = scheduler.operator.pending().len(),
            "scheduler ready"
        );
        Ok(scheduler)
    }

    /// Operator events, collaborators and one step of every task, without
    /// waiting for the period to end.
    ///
    /// # Errors
    /// [`CycleError::Task`] if a task faults.
    pub fn step_tasks(&mut self) -> Result<(), CycleError> {
        self.operator
            .apply_due(self.tick, self.cell.settings_mut());
        self.cell.advance_collaborators();

        self.arm.step(&mut self.cell.arm_view())?;
        self.magazine.step(&mut self.cell.magazine_view())?;
        self.inlet.step(&mut self.cell.inlet_view())?;
        Ok(())
    }

    /// Run one full tick: task steps, end-of-period wait, bookkeeping.
    ///
    /// # Errors
    /// [`CycleError::Task`] if a task faults.
    pub fn tick(&mut self) -> Result<TickSlack, CycleError> {
        let started = self.timer.now_ns();
        self.step_tasks()?;
        let processing_ns = self.timer.now_ns() - started;

        let slack = self.timer.wait_till_end_of_tick();
        self.stats.record(processing_ns, slack.is_overrun());
        if slack.is_overrun() {
            report_overrun(self.tick, slack);
        }

        if self.tick % self.telemetry_interval == 0 {
            let snapshot = Telemetry::capture(self.tick, &self.cell, slack);
            snapshot.emit();
            self.last_telemetry = Some(snapshot);
        }

        self.tick += 1;
        Ok(slack)
    }

    /// Tick until `running` is cleared or `max_ticks` ticks have run.
    ///
    /// # Errors
    /// The first [`CycleError`] a tick returns.
    pub fn run(
        &mut self,
        running: &AtomicBool,
        max_ticks: Option<u64>,
    ) -> Result<RunSummary, CycleError> {
        info!(
            period_ns = self.timer.period_ns(),
            max_ticks, "entering tick loop"
        );
        while running.load(Ordering::SeqCst) {
            if max_ticks.is_some_and(|limit| self.tick >= limit) {
                break;
            }
            self.tick()?;
        }

        let summary = self.summary();
        info!(
            ticks = summary.ticks,
            boxes = summary.boxes_stacked,
            pallets = summary.pallets_completed,
            overruns = summary.overruns,
            avg_tick_ns = summary.stats.avg_tick_ns(),
            max_tick_ns = summary.stats.max_tick_ns,
            "tick loop stopped"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.tick,
            boxes_stacked: self.cell.boxes().stacked(),
            pallets_completed: self.cell.boxes().pallets(),
            overruns: self.stats.overruns,
            stats: self.stats,
        }
    }

    /// Ticks completed so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn cell(&self) -> &Workcell {
        &self.cell
    }

    /// Operator access outside the script (tests, interactive tools).
    #[inline]
    pub fn cell_mut(&mut self) -> &mut Workcell {
        &mut self.cell
    }

    #[inline]
    pub fn arm(&self) -> &ArmTask {
        &self.arm
    }

    #[inline]
    pub fn magazine(&self) -> &MagazineTask {
        &self.magazine
    }

    #[inline]
    pub fn inlet(&self) -> &InletTask {
        &self.inlet
    }

    #[inline]
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    #[inline]
    pub fn last_telemetry(&self) -> Option<&Telemetry> {
        self.last_telemetry.as_ref()
    }
}

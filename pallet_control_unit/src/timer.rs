//! Fixed-period tick pacing.
//!
//! [`TickTimer`] keeps a baseline (start of the current period). At the end
//! of each tick it compares the time elapsed since the baseline with the
//! period:
//!
//! - elapsed < period: the baseline moves forward by exactly one period and
//!   the timer sleeps until it.
//! - elapsed ≥ period: overrun. No sleep; the baseline resynchronizes to
//!   "now".
//!
//! Either way the returned slack is `period − elapsed` (non-positive on
//! overrun). Time comes from a [`Clock`], so tests can drive it by hand.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
#[cfg(not(feature = "rt"))]
use std::time::Instant;

/// Monotonic time source with absolute sleeps.
pub trait Clock {
    /// Monotonic time [ns] since an arbitrary, fixed origin.
    fn now_ns(&mut self) -> i64;

    /// Block until `now_ns() >= deadline_ns`. Returns at once if the
    /// deadline already passed.
    fn sleep_until_ns(&mut self, deadline_ns: i64);
}

/// Wall-clock implementation on the OS monotonic clock.
///
/// With the `rt` feature time is read from `CLOCK_MONOTONIC` and sleeps use
/// `clock_nanosleep(TIMER_ABSTIME)` on the deadline itself. Without it,
/// `Instant` and `thread::sleep` give approximate pacing.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    #[cfg(feature = "rt")]
    origin_ns: i64,
    #[cfg(not(feature = "rt"))]
    origin: Instant,
}

#[cfg(feature = "rt")]
mod monotonic {
    use nix::sys::time::TimeSpec;
    use nix::time::{ClockId, clock_gettime};

    const NS_PER_SEC: i64 = 1_000_000_000;

    /// Absolute `CLOCK_MONOTONIC` reading [ns].
    pub(super) fn read_ns() -> i64 {
        // CLOCK_MONOTONIC is always available on Linux.
        clock_gettime(ClockId::CLOCK_MONOTONIC)
            .map_or(0, |ts| i64::from(ts.tv_sec()) * NS_PER_SEC + i64::from(ts.tv_nsec()))
    }

    pub(super) fn timespec(abs_ns: i64) -> TimeSpec {
        TimeSpec::new((abs_ns / NS_PER_SEC) as _, (abs_ns % NS_PER_SEC) as _)
    }
}

impl MonotonicClock {
    #[cfg(feature = "rt")]
    pub fn new() -> Self {
        Self {
            origin_ns: monotonic::read_ns(),
        }
    }

    #[cfg(not(feature = "rt"))]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "rt")]
impl Clock for MonotonicClock {
    fn now_ns(&mut self) -> i64 {
        monotonic::read_ns() - self.origin_ns
    }

    fn sleep_until_ns(&mut self, deadline_ns: i64) {
        use nix::errno::Errno;
        use nix::time::{ClockId, ClockNanosleepFlags, clock_nanosleep};

        let wake = monotonic::timespec(self.origin_ns + deadline_ns);
        // Restart on signals; the deadline stays the same.
        while let Err(Errno::EINTR) =
            clock_nanosleep(ClockId::CLOCK_MONOTONIC, ClockNanosleepFlags::TIMER_ABSTIME, &wake)
        {}
    }
}

#[cfg(not(feature = "rt"))]
impl Clock for MonotonicClock {
    fn now_ns(&mut self) -> i64 {
        i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }

    fn sleep_until_ns(&mut self, deadline_ns: i64) {
        let remaining = deadline_ns - self.now_ns();
        if remaining > 0 {
            std::thread::sleep(Duration::from_nanos(remaining as u64));
        }
    }
}

/// Hand-driven clock for simulation and deterministic tests.
///
/// Clones share the same time, so a test can keep a handle while the
/// scheduler owns another. Sleeping jumps straight to the deadline.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `ns` nanoseconds pass.
    pub fn advance(&self, ns: i64) {
        self.now.set(self.now.get() + ns);
    }

    pub fn now(&self) -> i64 {
        self.now.get()
    }
}

impl Clock for ManualClock {
    fn now_ns(&mut self) -> i64 {
        self.now.get()
    }

    fn sleep_until_ns(&mut self, deadline_ns: i64) {
        if deadline_ns > self.now.get() {
            self.now.set(deadline_ns);
        }
    }
}

/// Result of one end-of-tick wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSlack {
    /// Time spent since the period baseline [ns].
    pub elapsed_ns: i64,
    /// `period − elapsed` [ns]; non-positive on overrun.
    pub slack_ns: i64,
}

impl TickSlack {
    #[inline]
    pub const fn is_overrun(&self) -> bool {
        self.slack_ns <= 0
    }
}

/// Fixed-period pacer.
#[derive(Debug)]
pub struct TickTimer<K: Clock> {
    clock: K,
    period_ns: i64,
    baseline_ns: i64,
}

impl<K: Clock> TickTimer<K> {
    /// Start the first period now.
    pub fn new(mut clock: K, period: Duration) -> Self {
        let baseline_ns = clock.now_ns();
        Self {
            clock,
            period_ns: i64::try_from(period.as_nanos()).unwrap_or(i64::MAX),
            baseline_ns,
        }
    }

    #[inline]
    pub fn period_ns(&self) -> i64 {
        self.period_ns
    }

    /// Start of the current period [ns].
    #[inline]
    pub fn baseline_ns(&self) -> i64 {
        self.baseline_ns
    }

    /// Current clock reading [ns].
    #[inline]
    pub fn now_ns(&mut self) -> i64 {
        self.clock.now_ns()
    }

    /// Sleep out the rest of the period and start the next one.
    pub fn wait_till_end_of_tick(&mut self) -> TickSlack {
        let now = self.clock.now_ns();
        let elapsed_ns = now - self.baseline_ns;

        if elapsed_ns < self.period_ns {
            self.baseline_ns += self.period_ns;
            self.clock.sleep_until_ns(self.baseline_ns);
        } else {
            self.baseline_ns = now;
        }

        TickSlack {
            elapsed_ns,
            slack_ns: self.period_ns - elapsed_ns,
        }
    }
}

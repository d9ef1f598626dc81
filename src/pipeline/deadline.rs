//! Idle periods and time budgets.
//!
//! The runtime never reads a clock on its own. A host hands out idle periods
//! ([`IdleHost::request_idle`]); each period is a [`Deadline`] the work loop
//! polls between units of work.
//!
//! - [`IdleDeadline`] - wall-clock budget (`web_time`, so it also works on wasm)
//! - [`Unbounded`] - never asks to yield
//! - [`ManualClock`] / [`ManualDeadline`] - deterministic time for tests
//! - [`StepDeadline`] - a budget counted in units of work

use std::cell::Cell;
use std::rc::Rc;

use web_time::{Duration, Instant};

/// Time left in the current idle period.
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

impl<D: Deadline + ?Sized> Deadline for &D {
    fn time_remaining(&self) -> Duration {
        (**self).time_remaining()
    }
}

/// Source of idle periods.
///
/// Returning `None` means the host is shutting down; [`Runtime::run`] returns.
///
/// Any `FnMut() -> Option<D>` is a host.
///
/// [`Runtime::run`]: crate::Runtime::run
pub trait IdleHost {
    type Deadline: Deadline;

    fn request_idle(&mut self) -> Option<Self::Deadline>;
}

impl<D: Deadline, F: FnMut() -> Option<D>> IdleHost for F {
    type Deadline = D;

    fn request_idle(&mut self) -> Option<D> {
        self()
    }
}

// =============================================================================
// Wall clock
// =============================================================================

/// Idle period ending at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct IdleDeadline {
    ends_at: Instant,
}

impl IdleDeadline {
    /// Period of `budget` starting now.
    pub fn after(budget: Duration) -> Self {
        Self {
            ends_at: Instant::now() + budget,
        }
    }

    pub fn ends_at(&self) -> Instant {
        self.ends_at
    }
}

impl Deadline for IdleDeadline {
    fn time_remaining(&self) -> Duration {
        self.ends_at.saturating_duration_since(Instant::now())
    }
}

/// Deadline that never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// Host handing out `slices` wall-clock periods of `budget` each.
#[derive(Debug, Clone)]
pub struct SliceHost {
    budget: Duration,
    remaining: usize,
}

impl SliceHost {
    pub fn new(budget: Duration, slices: usize) -> Self {
        Self {
            budget,
            remaining: slices,
        }
    }

    /// Periods not handed out yet.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl IdleHost for SliceHost {
    type Deadline = IdleDeadline;

    fn request_idle(&mut self) -> Option<IdleDeadline> {
        self.remaining = self.remaining.checked_sub(1)?;
        Some(IdleDeadline::after(self.budget))
    }
}

// =============================================================================
// Deterministic time
// =============================================================================

/// A manually-advanced clock.
///
/// Clones share the same time. Nothing moves unless [`ManualClock::advance`]
/// is called, typically from inside a component render to simulate slow work.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, delta: Duration) {
        self.elapsed.set(self.elapsed.get().saturating_add(delta));
    }

    /// Time since the clock was created.
    pub fn now(&self) -> Duration {
        self.elapsed.get()
    }

    /// Deadline `budget` from the current time.
    pub fn deadline(&self, budget: Duration) -> ManualDeadline {
        ManualDeadline {
            clock: self.clone(),
            ends_at: self.now().saturating_add(budget),
        }
    }
}

/// Deadline measured on a [`ManualClock`].
#[derive(Debug, Clone)]
pub struct ManualDeadline {
    clock: ManualClock,
    ends_at: Duration,
}

impl Deadline for ManualDeadline {
    fn time_remaining(&self) -> Duration {
        self.ends_at.saturating_sub(self.clock.now())
    }
}

/// Deadline that allows exactly `units` units of work.
///
/// Each poll consumes one step; the work loop polls once before every unit.
#[derive(Debug)]
pub struct StepDeadline {
    steps: Cell<usize>,
}

impl StepDeadline {
    pub fn new(units: usize) -> Self {
        Self {
            steps: Cell::new(units),
        }
    }

    /// Steps not consumed yet.
    pub fn remaining(&self) -> usize {
        self.steps.get()
    }
}

impl Deadline for StepDeadline {
    fn time_remaining(&self) -> Duration {
        match self.steps.get() {
            0 => Duration::ZERO,
            n => {
                self.steps.set(n - 1);
                Duration::MAX
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_deadline() {
        let clock = ManualClock::new();
        let deadline = clock.deadline(Duration::from_millis(5));
        assert_eq!(deadline.time_remaining(), Duration::from_millis(5));
        clock.advance(Duration::from_millis(3));
        assert_eq!(deadline.time_remaining(), Duration::from_millis(2));
        clock.advance(Duration::from_millis(10));
        assert_eq!(deadline.time_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_step_deadline() {
        let deadline = StepDeadline::new(2);
        assert_eq!(deadline.time_remaining(), Duration::MAX);
        assert_eq!(deadline.time_remaining(), Duration::MAX);
        assert_eq!(deadline.time_remaining(), Duration::ZERO);
        assert_eq!(deadline.remaining(), 0);
    }

    #[test]
    fn test_slice_host_runs_out() {
        let mut host = SliceHost::new(Duration::from_millis(1), 2);
        assert!(host.request_idle().is_some());
        assert!(host.request_idle().is_some());
        assert!(host.request_idle().is_none());
        assert_eq!(host.remaining(), 0);
    }

    #[test]
    fn test_closure_host() {
        let mut calls = 0;
        let mut host = || {
            calls += 1;
            (calls <= 1).then_some(Unbounded)
        };
        assert!(host.request_idle().is_some());
        assert!(host.request_idle().is_none());
    }

    #[test]
    fn test_idle_deadline_expires() {
        let deadline = IdleDeadline::after(Duration::ZERO);
        assert_eq!(deadline.time_remaining(), Duration::ZERO);
        assert!(Unbounded.time_remaining() > Duration::from_secs(3600));
    }
}

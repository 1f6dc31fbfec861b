//! Tick scheduling.
//!
//! One pending tick at a time. A tick is due once the clock passes its
//! deadline; taking it re-arms the next one at `deadline + delay`, so a
//! host that polls late catches up instead of stretching the animation.
//! Cancelling drops the pending deadline, which is all it takes to stop a
//! reveal: no closure chain to unwind.

use std::time::{Duration, Instant};

/// Timer bookkeeping for the reveal loop.
#[derive(Debug, Clone)]
pub struct Scheduler {
    delay: Duration,
    deadline: Option<Instant>,
    ticks: u64,
}

impl Scheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            ticks: 0,
        }
    }

    /// Deadline of the pending tick, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Total ticks taken over the scheduler's lifetime.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Start the timer if idle. A running timer keeps its deadline.
    pub fn arm(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(self.after(now));
        }
    }

    /// Drop the pending tick. Idempotent; returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Take the pending tick if it is due at `now`, re-arming the next one.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(due) if due <= now => {
                self.deadline = Some(self.after(due));
                self.ticks += 1;
                true
            }
            _ => false,
        }
    }

    /// Take the pending tick regardless of the clock.
    pub fn take_now(&mut self, now: Instant) -> bool {
        if self.deadline.is_none() {
            return false;
        }
        self.deadline = Some(self.after(now));
        self.ticks += 1;
        true
    }

    /// One delay past `from`; saturates to `from` when the clock cannot
    /// represent it.
    fn after(&self, from: Instant) -> Instant {
        from.checked_add(self.delay).unwrap_or(from)
    }
}

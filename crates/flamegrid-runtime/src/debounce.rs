//! Cancel-pending, schedule-new timer primitive.
//!
//! A [`Debouncer`] holds at most one pending value. Every
//! [`schedule`](Debouncer::schedule) replaces it and pushes the deadline out
//! to `now + quiescence`, so only the last value of a burst is ever
//! delivered. Time is passed in by the caller; nothing here reads a clock.
//!
//! # Invariants
//!
//! - **Latest-wins**: a delivered value is always the most recently scheduled.
//! - **Quiescence**: a value is delivered only once `quiescence` has elapsed
//!   since the last `schedule` call.
//! - **At-most-once**: `poll` yields a given value once, then the debouncer is
//!   idle.

use std::time::Duration;

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Duration,
}

/// Latest-wins debouncer over values of type `T`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiescence: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub const fn new(quiescence: Duration) -> Self {
        Self {
            quiescence,
            pending: None,
        }
    }

    #[must_use]
    pub const fn quiescence(&self) -> Duration {
        self.quiescence
    }

    /// Arm the timer with `value`, cancelling anything pending.
    ///
    /// Returns `true` if a pending value was replaced.
    pub fn schedule(&mut self, value: T, now: Duration) -> bool {
        let deadline = now.saturating_add(self.quiescence);
        self.pending.replace(Pending { value, deadline }).is_some()
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    /// Drop the pending value without delivering it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    #[must_use]
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }
}

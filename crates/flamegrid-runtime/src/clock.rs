//! Monotonic time sources.

use std::time::Duration;

/// A source of monotonically non-decreasing time since an arbitrary origin.
pub trait MonotonicClock {
    fn now_mono(&self) -> Duration;
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Convert a host timestamp in milliseconds (`performance.now()`) and
    /// store it. Negative or non-finite input is ignored.
    pub fn set_millis(&mut self, ms: f64) {
        if ms.is_finite() && ms >= 0.0 {
            self.now = Duration::from_secs_f64(ms / 1000.0);
        }
    }
}

impl MonotonicClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

/// Wall-backed monotonic clock. Uses `web_time` so it also works on
/// `wasm32-unknown-unknown`, where `std::time::Instant` panics.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: web_time::Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn deterministic_clock_advances_monotonically() {
        let mut c = DeterministicClock::new();
        assert_eq!(c.now_mono(), Duration::ZERO);

        c.advance(Duration::from_millis(10));
        assert_eq!(c.now_mono(), Duration::from_millis(10));

        c.advance(Duration::from_millis(5));
        assert_eq!(c.now_mono(), Duration::from_millis(15));

        // Saturation: don't panic or wrap.
        c.set(Duration::MAX);
        c.advance(Duration::from_secs(1));
        assert_eq!(c.now_mono(), Duration::MAX);
    }

    #[test]
    fn set_millis_ignores_garbage() {
        let mut c = DeterministicClock::new();
        c.set_millis(250.0);
        assert_eq!(c.now_mono(), Duration::from_millis(250));

        c.set_millis(f64::NAN);
        c.set_millis(-1.0);
        c.set_millis(f64::INFINITY);
        assert_eq!(c.now_mono(), Duration::from_millis(250));
    }

    #[test]
    fn system_clock_never_goes_backwards() {
        let c = SystemClock::new();
        let a = c.now_mono();
        let b = c.now_mono();
        assert!(b >= a);
    }
}

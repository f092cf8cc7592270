#![forbid(unsafe_code)]

//! Cooperative frame loop for flamegrid.
//!
//! The host owns the real per-frame callback (`requestAnimationFrame`, a
//! headless `for` loop, a test) and calls [`FrameScheduler::tick`] from it.
//! Everything the loop needs (pause flag, pending resize, cached layout)
//! lives on the scheduler value itself.

pub mod clock;
pub mod debounce;
pub mod scheduler;

pub use clock::{DeterministicClock, MonotonicClock, SystemClock};
pub use debounce::Debouncer;
pub use scheduler::{FrameScheduler, SchedulerConfig, SchedulerError, TickOutcome};

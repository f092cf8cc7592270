#![forbid(unsafe_code)]

//! Reference grid engine for flamegrid.
//!
//! [`FireEngine`] is a deterministic port of the classic aafire heat
//! automaton, dithered into ANSI-colored character cells. It implements
//! [`flamegrid_core::GridEngine`] and [`flamegrid_core::AttrProbe`] so the
//! scheduler, the parity harness and the web front end have something real
//! to drive.

pub mod dither;
pub mod fire;
pub mod prng;

pub use dither::{CellDither, DitherCell};
pub use fire::FireEngine;
pub use prng::{DEFAULT_SEED, Xorshift32};

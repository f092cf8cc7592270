#![forbid(unsafe_code)]

//! Parity harness for flamegrid engines.
//!
//! Certifies that an engine build is bit-identical to a trusted reference:
//! the engine is seeded, stepped to each checkpoint, and its grid is compared
//! element-wise with golden dumps captured from the reference.
//!
//! # Environment
//!
//! | Variable | Effect |
//! |---|---|
//! | `FLAMEGRID_SEED` | engine seed (default 42) |
//! | `FLAMEGRID_GOLDEN_DIR` | golden directory (default `tests/golden`) |
//! | `FLAMEGRID_CHECKPOINTS` | comma-separated steps (default `1,10,50,100`) |
//! | `FLAMEGRID_PARITY_JSONL` | append a JSONL report to this file |
//! | `BLESS=1` | regenerate goldens before verifying |

pub mod golden;
pub mod jsonl;
pub mod parity;

pub use golden::{ArrayKind, GoldenError, GoldenStore};
pub use jsonl::ParityLog;
pub use parity::{
    ArrayComparison, CheckpointOutcome, CheckpointResult, Checkpoints, ConfigError, ElementDiff,
    HarnessError, ParityConfig, ParityReport, generate_goldens, is_bless_mode, run_parity,
};

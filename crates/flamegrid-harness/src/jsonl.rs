//! JSONL parity log.
//!
//! One line per checkpoint followed by a summary line:
//!
//! ```json
//! {"event":"checkpoint","step":1,"status":"pass"}
//! {"event":"checkpoint","step":10,"status":"mismatch","chars":{...},"attrs":{...}}
//! {"event":"summary","cols":80,"rows":32,"seed":42,"passed":1,"failed":1}
//! ```
//!
//! Enabled by pointing `FLAMEGRID_PARITY_JSONL` at a file; lines are
//! appended.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::json;

use crate::parity::{CheckpointOutcome, ParityReport};

pub const ENV_PARITY_JSONL: &str = "FLAMEGRID_PARITY_JSONL";

#[derive(Serialize)]
struct CheckpointLine<'a> {
    event: &'static str,
    #[serde(flatten)]
    outcome: &'a CheckpointOutcome,
}

/// Append-only JSONL writer. A no-op logger swallows everything.
#[derive(Debug)]
pub struct ParityLog {
    writer: Option<BufWriter<File>>,
}

impl ParityLog {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(file)),
        })
    }

    #[must_use]
    pub fn noop() -> Self {
        Self { writer: None }
    }

    /// Log to `$FLAMEGRID_PARITY_JSONL` if set, otherwise no-op.
    pub fn from_env() -> io::Result<Self> {
        match std::env::var_os(ENV_PARITY_JSONL) {
            Some(path) if !path.is_empty() => Self::new(Path::new(&path)),
            _ => Ok(Self::noop()),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn write_report(&mut self, report: &ParityReport) -> io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        for outcome in &report.outcomes {
            serde_json::to_writer(
                &mut *writer,
                &CheckpointLine {
                    event: "checkpoint",
                    outcome,
                },
            )?;
            writer.write_all(b"\n")?;
        }
        let summary = json!({
            "event": "summary",
            "cols": report.cols,
            "rows": report.rows,
            "seed": report.seed,
            "passed": report.passed(),
            "failed": report.failed(),
        });
        serde_json::to_writer(&mut *writer, &summary)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

//! Cross-implementation parity protocol.
//!
//! The engine under test is seeded, stepped one step at a time, and at every
//! checkpoint its `chars` / `attrs` arrays are compared element-wise with the
//! golden pair for that step. A failing checkpoint (mismatch or unreadable
//! golden) is recorded and the run moves on; only losing the snapshot itself
//! aborts.

use std::fmt;
use std::path::PathBuf;

use flamegrid_core::{GridEngine, GridSnapshot, SnapshotError};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::golden::{ArrayKind, GoldenError, GoldenStore};

/// Reference checkpoint steps.
pub const DEFAULT_CHECKPOINTS: [u32; 4] = [1, 10, 50, 100];

/// Reference grid used for golden capture.
pub const DEFAULT_COLS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 32;
pub const DEFAULT_SEED: u32 = 42;
pub const DEFAULT_GOLDEN_DIR: &str = "tests/golden";

/// How many differing elements are kept per array for diagnosis.
pub const MAX_REPORTED_DIFFS: usize = 5;

pub const ENV_SEED: &str = "FLAMEGRID_SEED";
pub const ENV_GOLDEN_DIR: &str = "FLAMEGRID_GOLDEN_DIR";
pub const ENV_CHECKPOINTS: &str = "FLAMEGRID_CHECKPOINTS";

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyCheckpoints,
    ZeroCheckpoint,
    /// Checkpoints must be strictly ascending.
    Unordered { prev: u32, next: u32 },
    ZeroDimension,
    InvalidValue { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCheckpoints => f.write_str("checkpoint list is empty"),
            Self::ZeroCheckpoint => f.write_str("checkpoint 0 is not a step count"),
            Self::Unordered { prev, next } => {
                write!(f, "checkpoints must ascend strictly ({prev} then {next})")
            }
            Self::ZeroDimension => f.write_str("grid width and height must be positive"),
            Self::InvalidValue { name, value } => write!(f, "invalid {name}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Non-empty, strictly ascending, positive step counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Checkpoints(Vec<u32>);

impl Checkpoints {
    pub fn new(steps: Vec<u32>) -> Result<Self, ConfigError> {
        let first = *steps.first().ok_or(ConfigError::EmptyCheckpoints)?;
        if first == 0 {
            return Err(ConfigError::ZeroCheckpoint);
        }
        if let Some(w) = steps.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ConfigError::Unordered {
                prev: w[0],
                next: w[1],
            });
        }
        Ok(Self(steps))
    }

    /// Parse a comma-separated list such as `"1,10,50,100"`.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let steps = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                    name: "checkpoint",
                    value: s.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(steps)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a constructed list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The final checkpoint, i.e. how many steps a run takes.
    #[must_use]
    pub fn last(&self) -> u32 {
        self.0.last().copied().unwrap_or(0)
    }
}

impl Default for Checkpoints {
    fn default() -> Self {
        Self(DEFAULT_CHECKPOINTS.to_vec())
    }
}

/// Everything a parity run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityConfig {
    pub cols: u16,
    pub rows: u16,
    pub seed: u32,
    pub checkpoints: Checkpoints,
    pub golden_dir: PathBuf,
}

impl Default for ParityConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            seed: DEFAULT_SEED,
            checkpoints: Checkpoints::default(),
            golden_dir: PathBuf::from(DEFAULT_GOLDEN_DIR),
        }
    }
}

impl ParityConfig {
    #[must_use]
    pub fn with_grid(mut self, cols: u16, rows: u16) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_checkpoints(mut self, checkpoints: Checkpoints) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    #[must_use]
    pub fn with_golden_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.golden_dir = dir.into();
        self
    }

    /// Defaults overridden by `FLAMEGRID_SEED`, `FLAMEGRID_GOLDEN_DIR` and
    /// `FLAMEGRID_CHECKPOINTS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(seed) = lookup(ENV_SEED) {
            config.seed = seed
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: ENV_SEED,
                    value: seed,
                })?;
        }
        if let Some(dir) = lookup(ENV_GOLDEN_DIR).filter(|d| !d.is_empty()) {
            config.golden_dir = PathBuf::from(dir);
        }
        if let Some(list) = lookup(ENV_CHECKPOINTS) {
            config.checkpoints = Checkpoints::parse(&list)?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        Ok(())
    }

    #[must_use]
    pub fn store(&self) -> GoldenStore {
        GoldenStore::new(&self.golden_dir)
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// One differing element. A side is `None` when that array is too short to
/// hold `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementDiff {
    pub index: usize,
    pub actual: Option<u32>,
    pub expected: Option<u32>,
}

/// Element-wise comparison of one array against its golden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayComparison {
    pub kind: ArrayKind,
    /// Number of differing indices over the longer of the two arrays.
    pub differing: usize,
    /// The first [`MAX_REPORTED_DIFFS`] differences.
    pub first: Vec<ElementDiff>,
}

impl ArrayComparison {
    #[must_use]
    pub fn compare(kind: ArrayKind, actual: &[u32], expected: &[u32]) -> Self {
        let len = actual.len().max(expected.len());
        let mut differing = 0;
        let mut first = Vec::new();
        for index in 0..len {
            let a = actual.get(index).copied();
            let e = expected.get(index).copied();
            if a != e {
                differing += 1;
                if first.len() < MAX_REPORTED_DIFFS {
                    first.push(ElementDiff {
                        index,
                        actual: a,
                        expected: e,
                    });
                }
            }
        }
        Self {
            kind,
            differing,
            first,
        }
    }

    #[must_use]
    pub fn matches(&self) -> bool {
        self.differing == 0
    }
}

/// Result of one checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckpointResult {
    Pass,
    Mismatch {
        chars: ArrayComparison,
        attrs: ArrayComparison,
    },
    /// A golden file was missing or unreadable.
    GoldenUnavailable { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointOutcome {
    pub step: u32,
    #[serde(flatten)]
    pub result: CheckpointResult,
}

impl CheckpointOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self.result, CheckpointResult::Pass)
    }

    /// Diff count for `kind`, zero unless the checkpoint mismatched.
    #[must_use]
    pub fn differing(&self, kind: ArrayKind) -> usize {
        match &self.result {
            CheckpointResult::Mismatch { chars, attrs } => match kind {
                ArrayKind::Chars => chars.differing,
                ArrayKind::Attrs => attrs.differing,
            },
            _ => 0,
        }
    }
}

impl fmt::Display for CheckpointOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            CheckpointResult::Pass => write!(f, "Frame {:3}: PASS", self.step),
            CheckpointResult::GoldenUnavailable { error } => {
                write!(f, "Frame {:3}: FAIL (golden unavailable: {error})", self.step)
            }
            CheckpointResult::Mismatch { chars, attrs } => {
                write!(
                    f,
                    "Frame {:3}: FAIL ({} chars differ, {} attrs differ)",
                    self.step, chars.differing, attrs.differing
                )?;
                for cmp in [chars, attrs] {
                    for d in &cmp.first {
                        write!(
                            f,
                            "\n  {}[{}]: got {}, expected {}",
                            cmp.kind,
                            d.index,
                            hex_or_absent(d.actual),
                            hex_or_absent(d.expected)
                        )?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn hex_or_absent(v: Option<u32>) -> String {
    v.map_or_else(|| "<absent>".to_string(), |v| format!("0x{v:08x}"))
}

/// Compare one snapshot against the goldens for `step`.
pub fn check_checkpoint(
    store: &GoldenStore,
    step: u32,
    snapshot: &GridSnapshot<'_>,
) -> CheckpointOutcome {
    let loaded = store
        .load(step, ArrayKind::Chars)
        .and_then(|chars| Ok((chars, store.load(step, ArrayKind::Attrs)?)));
    let result = match loaded {
        Err(e) => CheckpointResult::GoldenUnavailable {
            error: e.to_string(),
        },
        Ok((gold_chars, gold_attrs)) => {
            let chars = ArrayComparison::compare(ArrayKind::Chars, snapshot.chars(), &gold_chars);
            let attrs = ArrayComparison::compare(ArrayKind::Attrs, snapshot.attrs(), &gold_attrs);
            if chars.matches() && attrs.matches() {
                CheckpointResult::Pass
            } else {
                CheckpointResult::Mismatch { chars, attrs }
            }
        }
    };
    CheckpointOutcome { step, result }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParityReport {
    pub cols: u16,
    pub rows: u16,
    pub seed: u32,
    pub outcomes: Vec<CheckpointOutcome>,
}

impl ParityReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// `"{passed} passed, {failed} failed"`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} passed, {} failed", self.passed(), self.failed())
    }

    /// Process exit status: 0 when every checkpoint passed, else 1.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

// ============================================================================
// Driver
// ============================================================================

#[derive(Debug)]
pub enum HarnessError {
    Config(ConfigError),
    Snapshot { step: u32, source: SnapshotError },
    Golden(GoldenError),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Snapshot { step, source } => write!(f, "step {step}: {source}"),
            Self::Golden(e) => write!(f, "golden: {e}"),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Snapshot { source, .. } => Some(source),
            Self::Golden(e) => Some(e),
        }
    }
}

impl From<ConfigError> for HarnessError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<GoldenError> for HarnessError {
    fn from(e: GoldenError) -> Self {
        Self::Golden(e)
    }
}

/// Seed `engine`, step it through every checkpoint and call `visit` with
/// the snapshot at each one.
fn walk_checkpoints<E, F>(engine: &mut E, config: &ParityConfig, mut visit: F) -> Result<(), HarnessError>
where
    E: GridEngine + ?Sized,
    F: FnMut(u32, &GridSnapshot<'_>) -> Result<(), HarnessError>,
{
    config.validate()?;
    engine.init_seeded(config.cols, config.rows, config.seed);
    let mut step = 0;
    for &checkpoint in config.checkpoints.as_slice() {
        while step < checkpoint {
            engine.step();
            step += 1;
        }
        let snapshot = engine
            .snapshot()
            .map_err(|source| HarnessError::Snapshot { step, source })?;
        visit(step, &snapshot)?;
    }
    Ok(())
}

/// Run the parity protocol against the goldens in `config.golden_dir`.
pub fn run_parity<E>(engine: &mut E, config: &ParityConfig) -> Result<ParityReport, HarnessError>
where
    E: GridEngine + ?Sized,
{
    let _span = info_span!("parity", seed = config.seed, cols = config.cols, rows = config.rows)
        .entered();
    let store = config.store();
    let mut outcomes = Vec::with_capacity(config.checkpoints.len());

    walk_checkpoints(engine, config, |step, snapshot| {
        let outcome = check_checkpoint(&store, step, snapshot);
        if outcome.passed() {
            debug!(step, "checkpoint passed");
        } else {
            warn!(
                step,
                chars = outcome.differing(ArrayKind::Chars),
                attrs = outcome.differing(ArrayKind::Attrs),
                "checkpoint failed"
            );
        }
        outcomes.push(outcome);
        Ok(())
    })?;

    let report = ParityReport {
        cols: config.cols,
        rows: config.rows,
        seed: config.seed,
        outcomes,
    };
    info!(passed = report.passed(), failed = report.failed(), "parity run complete");
    Ok(report)
}

/// Capture goldens from a trusted engine. Returns the files written.
pub fn generate_goldens<E>(engine: &mut E, config: &ParityConfig) -> Result<Vec<PathBuf>, HarnessError>
where
    E: GridEngine + ?Sized,
{
    let store = config.store();
    let mut written = Vec::with_capacity(config.checkpoints.len() * 2);
    walk_checkpoints(engine, config, |step, snapshot| {
        written.extend(store.store_dump(step, &snapshot.to_dump())?);
        debug!(step, cells = snapshot.len(), "golden captured");
        Ok(())
    })?;
    info!(files = written.len(), dir = %store.root().display(), "goldens written");
    Ok(written)
}

/// Whether golden files should be regenerated (`BLESS=1`).
#[must_use]
pub fn is_bless_mode() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn checkpoints_validate() {
        assert_eq!(Checkpoints::new(vec![]), Err(ConfigError::EmptyCheckpoints));
        assert_eq!(Checkpoints::new(vec![0, 1]), Err(ConfigError::ZeroCheckpoint));
        assert_eq!(
            Checkpoints::new(vec![1, 10, 10]),
            Err(ConfigError::Unordered { prev: 10, next: 10 })
        );
        assert_eq!(
            Checkpoints::new(vec![5, 2]),
            Err(ConfigError::Unordered { prev: 5, next: 2 })
        );
        assert_eq!(Checkpoints::new(vec![3]).unwrap().last(), 3);
    }

    #[test]
    fn checkpoints_parse() {
        assert_eq!(
            Checkpoints::parse(" 1, 10 ,50,100,").unwrap().as_slice(),
            &[1, 10, 50, 100]
        );
        assert!(matches!(
            Checkpoints::parse("1,x"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(Checkpoints::parse(""), Err(ConfigError::EmptyCheckpoints));
    }

    #[test]
    fn config_defaults_match_reference() {
        let c = ParityConfig::default();
        assert_eq!((c.cols, c.rows, c.seed), (80, 32, 42));
        assert_eq!(c.checkpoints.as_slice(), &DEFAULT_CHECKPOINTS);
        assert_eq!(c.golden_dir, PathBuf::from("tests/golden"));
    }

    #[test]
    fn config_from_lookup() {
        let c = ParityConfig::from_lookup(|k| match k {
            ENV_SEED => Some("7".into()),
            ENV_GOLDEN_DIR => Some("/tmp/g".into()),
            ENV_CHECKPOINTS => Some("2,4".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(c.seed, 7);
        assert_eq!(c.golden_dir, PathBuf::from("/tmp/g"));
        assert_eq!(c.checkpoints.as_slice(), &[2, 4]);

        let err = ParityConfig::from_lookup(|k| (k == ENV_SEED).then(|| "-1".into())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: ENV_SEED, .. }));
    }

    #[test]
    fn compare_counts_every_difference_but_keeps_five() {
        let actual: Vec<u32> = (0..10).collect();
        let expected = vec![100; 10];
        let cmp = ArrayComparison::compare(ArrayKind::Chars, &actual, &expected);
        assert_eq!(cmp.differing, 10);
        assert_eq!(cmp.first.len(), MAX_REPORTED_DIFFS);
        assert_eq!(
            cmp.first[2],
            ElementDiff {
                index: 2,
                actual: Some(2),
                expected: Some(100)
            }
        );
    }

    #[test]
    fn compare_covers_the_longer_array() {
        let cmp = ArrayComparison::compare(ArrayKind::Attrs, &[1, 2], &[1, 2, 3, 4]);
        assert_eq!(cmp.differing, 2);
        assert_eq!(cmp.first[0].actual, None);
        assert_eq!(cmp.first[0].expected, Some(3));

        let cmp = ArrayComparison::compare(ArrayKind::Attrs, &[1, 2, 9], &[1, 2]);
        assert_eq!(cmp.differing, 1);
        assert_eq!(cmp.first[0].expected, None);
    }

    #[test]
    fn report_summary_and_exit_code() {
        let pass = CheckpointOutcome {
            step: 1,
            result: CheckpointResult::Pass,
        };
        let fail = CheckpointOutcome {
            step: 10,
            result: CheckpointResult::GoldenUnavailable {
                error: "gone".into(),
            },
        };
        let mut report = ParityReport {
            cols: 80,
            rows: 32,
            seed: 42,
            outcomes: vec![pass.clone(), pass],
        };
        assert_eq!(report.summary(), "2 passed, 0 failed");
        assert_eq!(report.exit_code(), 0);

        report.outcomes.push(fail);
        assert_eq!(report.summary(), "2 passed, 1 failed");
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn outcome_display_lists_first_diffs() {
        let outcome = CheckpointOutcome {
            step: 10,
            result: CheckpointResult::Mismatch {
                chars: ArrayComparison::compare(ArrayKind::Chars, &[0x41], &[0x42]),
                attrs: ArrayComparison::compare(ArrayKind::Attrs, &[1], &[1]),
            },
        };
        assert_eq!(
            outcome.to_string(),
            "Frame  10: FAIL (1 chars differ, 0 attrs differ)\n  chars[0]: got 0x00000041, expected 0x00000042"
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = CheckpointOutcome {
            step: 50,
            result: CheckpointResult::Pass,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"step": 50, "status": "pass"}));
    }
}

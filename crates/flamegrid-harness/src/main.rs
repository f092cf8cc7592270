#![forbid(unsafe_code)]

//! `flamegrid-parity`: golden verification, golden generation and a
//! headless render loop for the reference fire engine.
//!
//! # Running
//!
//! ```sh
//! flamegrid-parity generate          # capture goldens into tests/golden
//! flamegrid-parity                   # verify against them
//! flamegrid-parity render 300        # 300 headless frames, print checksum
//! flamegrid-parity render 300 --wall-clock   # same, paced at ~60 fps
//! ```
//!
//! Exit status: 0 success, 1 parity failure, 2 usage or fatal error.
//! `RUST_LOG` controls diagnostics on stderr.

use std::env;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use flamegrid_core::{CellMetrics, Viewport};
use flamegrid_engine::FireEngine;
use flamegrid_harness::{
    Checkpoints, ConfigError, HarnessError, ParityConfig, ParityLog, ParityReport,
    generate_goldens, is_bless_mode, run_parity,
};
use flamegrid_render::Framebuffer;
use flamegrid_runtime::{
    DeterministicClock, FrameScheduler, MonotonicClock, SchedulerConfig, SchedulerError,
    SystemClock, TickOutcome,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: flamegrid-parity [verify|generate|render <frames>] [options]

Options:
  --seed <n>            engine seed (default 42, env FLAMEGRID_SEED)
  --golden-dir <dir>    golden directory (default tests/golden, env FLAMEGRID_GOLDEN_DIR)
  --checkpoints <list>  comma-separated steps (default 1,10,50,100, env FLAMEGRID_CHECKPOINTS)
  --cols <n>            grid columns for verify/generate (default 80)
  --rows <n>            grid rows for verify/generate (default 32)
  --width <px>          viewport width for render (default 800)
  --height <px>         viewport height for render (default 512)
  --dpr <ratio>         device pixel ratio for render (default 1)
  --wall-clock          pace render at real time instead of a simulated clock
  -h, --help            show this help";

/// Host frame interval for headless renders.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const EXIT_FATAL: u8 = 2;

#[derive(Debug, PartialEq)]
enum Command {
    Verify,
    Generate,
    Render { frames: u64 },
}

#[derive(Debug)]
struct Args {
    command: Command,
    config: ParityConfig,
    viewport: Viewport,
    wall_clock: bool,
}

#[derive(Debug)]
enum CliError {
    Usage(String),
    Harness(HarnessError),
    Scheduler(SchedulerError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) => write!(f, "{msg}\n\n{USAGE}"),
            Self::Harness(e) => write!(f, "{e}"),
            Self::Scheduler(e) => write!(f, "{e}"),
        }
    }
}

impl From<HarnessError> for CliError {
    fn from(e: HarnessError) -> Self {
        Self::Harness(e)
    }
}

impl From<SchedulerError> for CliError {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

fn usage(msg: impl Into<String>) -> CliError {
    CliError::Usage(msg.into())
}

fn value<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T, CliError> {
    let raw = args
        .next()
        .ok_or_else(|| usage(format!("{flag} requires a value")))?;
    raw.parse()
        .map_err(|_| usage(format!("invalid {flag} value: {raw:?}")))
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Default)]
struct Overrides {
    seed: Option<u32>,
    golden_dir: Option<PathBuf>,
    checkpoints: Option<Checkpoints>,
    cols: Option<u16>,
    rows: Option<u16>,
}

/// Parse `args` (without the program name). `load_config` supplies the
/// environment-derived base config and is only called once the command line
/// is known to want one. `Ok(None)` means help was requested.
fn parse_args(
    mut args: impl Iterator<Item = String>,
    load_config: impl FnOnce() -> Result<ParityConfig, ConfigError>,
) -> Result<Option<Args>, CliError> {
    let mut command = None;
    let mut viewport = Viewport::new(800.0, 512.0, 1.0);
    let mut wall_clock = false;
    let mut overrides = Overrides::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => overrides.seed = Some(value(&mut args, "--seed")?),
            "--golden-dir" => overrides.golden_dir = Some(value(&mut args, "--golden-dir")?),
            "--checkpoints" => {
                let list: String = value(&mut args, "--checkpoints")?;
                overrides.checkpoints = Some(
                    Checkpoints::parse(&list).map_err(|e| usage(format!("--checkpoints: {e}")))?,
                );
            }
            "--cols" => overrides.cols = Some(value(&mut args, "--cols")?),
            "--rows" => overrides.rows = Some(value(&mut args, "--rows")?),
            "--width" => viewport.width = value(&mut args, "--width")?,
            "--height" => viewport.height = value(&mut args, "--height")?,
            "--dpr" => viewport.dpr = value(&mut args, "--dpr")?,
            "--wall-clock" => wall_clock = true,
            "-h" | "--help" => return Ok(None),
            "verify" | "generate" | "render" if command.is_none() => {
                command = Some(match arg.as_str() {
                    "verify" => Command::Verify,
                    "generate" => Command::Generate,
                    _ => Command::Render {
                        frames: value(&mut args, "render")?,
                    },
                });
            }
            other => return Err(usage(format!("unexpected argument {other:?}"))),
        }
    }

    let mut config = load_config().map_err(HarnessError::from)?;
    if let Some(seed) = overrides.seed {
        config.seed = seed;
    }
    if let Some(dir) = overrides.golden_dir {
        config.golden_dir = dir;
    }
    if let Some(checkpoints) = overrides.checkpoints {
        config.checkpoints = checkpoints;
    }
    if let Some(cols) = overrides.cols {
        config.cols = cols;
    }
    if let Some(rows) = overrides.rows {
        config.rows = rows;
    }

    Ok(Some(Args {
        command: command.unwrap_or(Command::Verify),
        config,
        viewport,
        wall_clock,
    }))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn generate(config: &ParityConfig) -> Result<(), CliError> {
    println!(
        "Generating goldens: {}x{} grid, seed={}, dir={}",
        config.cols,
        config.rows,
        config.seed,
        config.golden_dir.display()
    );
    let files = generate_goldens(&mut FireEngine::new(), config)?;
    for path in &files {
        println!("  wrote {}", path.display());
    }
    Ok(())
}

fn verify(config: &ParityConfig) -> Result<u8, CliError> {
    if is_bless_mode() {
        generate(config)?;
    }
    println!(
        "Parity: {}x{} grid, seed={}, checkpoints={:?}",
        config.cols,
        config.rows,
        config.seed,
        config.checkpoints.as_slice()
    );
    let report = run_parity(&mut FireEngine::new(), config)?;
    for outcome in &report.outcomes {
        println!("  {outcome}");
    }
    println!("\nResults: {}", report.summary());

    Ok(conclude(&report, ParityLog::from_env()))
}

/// Append `report` to the JSONL log and return its exit status. A log that
/// cannot be opened or written is reported but never changes the verdict.
fn conclude(report: &ParityReport, log: io::Result<ParityLog>) -> u8 {
    if let Err(e) = log.and_then(|mut log| log.write_report(report)) {
        warn!(error = %e, "parity JSONL log not written");
        eprintln!("flamegrid-parity: JSONL log not written: {e}");
    }
    report.exit_code()
}

/// Run `frames` ticks headlessly. With `wall_clock` each frame waits one
/// frame interval and is stamped by the system clock; otherwise time is
/// simulated and the run is fully reproducible.
fn render(seed: u32, viewport: Viewport, frames: u64, wall_clock: bool) -> Result<(), CliError> {
    let surface = Framebuffer::new(0, 0, CellMetrics {
        width: 1,
        height: 1,
    });
    let mut scheduler = FrameScheduler::new(FireEngine::new(), surface, SchedulerConfig::default());
    let layout = scheduler.start_seeded(viewport, seed);

    let system = SystemClock::new();
    let mut simulated = DeterministicClock::new();
    let (mut switches, mut rects, mut glyphs) = (0u64, 0u64, 0u64);
    for _ in 0..frames {
        let now = if wall_clock {
            thread::sleep(FRAME_INTERVAL);
            system.now_mono()
        } else {
            simulated.advance(FRAME_INTERVAL);
            simulated.now_mono()
        };
        if let TickOutcome::Rendered(stats) = scheduler.tick(now)? {
            switches += u64::from(stats.fill_switches);
            rects += u64::from(stats.rects);
            glyphs += u64::from(stats.glyphs);
        }
    }

    let (width, height) = layout.surface_size_px();
    println!(
        "Rendered {} frames: {}x{} grid, {}x{} px, seed={}",
        scheduler.frames_rendered(),
        layout.cols,
        layout.rows,
        width,
        height,
        seed
    );
    println!(
        "  fill switches: {switches}, rects: {rects}, glyphs: {glyphs}"
    );
    println!("  framebuffer fnv1a64: {:016x}", scheduler.surface().checksum());
    Ok(())
}

fn run(args: Args) -> Result<u8, CliError> {
    match args.command {
        Command::Verify => verify(&args.config),
        Command::Generate => generate(&args.config).map(|()| 0),
        Command::Render { frames } => {
            render(args.config.seed, args.viewport, frames, args.wall_clock).map(|()| 0)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    let result =
        parse_args(env::args().skip(1), ParityConfig::from_env).and_then(|parsed| match parsed {
            Some(args) => run(args),
            None => {
                println!("{USAGE}");
                Ok(0)
            }
        });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("flamegrid-parity: {e}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    fn parse(list: &[&str]) -> Result<Option<Args>, CliError> {
        parse_args(args(list), || Ok(ParityConfig::default()))
    }

    fn bad_env() -> Result<ParityConfig, ConfigError> {
        ParityConfig::from_lookup(|name| (name == "FLAMEGRID_SEED").then(|| "hot".to_string()))
    }

    #[test]
    fn defaults_to_verify() {
        let args = parse(&[]).unwrap().unwrap();
        assert_eq!(args.command, Command::Verify);
        assert_eq!(args.config, ParityConfig::default());
    }

    #[test]
    fn options_override_config() {
        let args = parse(&[
            "generate",
            "--seed",
            "7",
            "--golden-dir",
            "/tmp/g",
            "--checkpoints",
            "2,3",
            "--cols",
            "40",
            "--rows",
            "20",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(args.command, Command::Generate);
        assert_eq!(args.config.seed, 7);
        assert_eq!(args.config.golden_dir, PathBuf::from("/tmp/g"));
        assert_eq!(args.config.checkpoints.as_slice(), &[2, 3]);
        assert_eq!((args.config.cols, args.config.rows), (40, 20));
    }

    #[test]
    fn render_takes_a_frame_count() {
        let args = parse(&["render", "30", "--width", "320", "--dpr", "2"])
            .unwrap()
            .unwrap();
        assert_eq!(args.command, Command::Render { frames: 30 });
        assert_eq!(args.viewport, Viewport::new(320.0, 512.0, 2.0));
        assert!(matches!(parse(&["render"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["render", "many"]), Err(CliError::Usage(_))));
    }

    #[test]
    fn rejects_unknown_arguments() {
        assert!(matches!(parse(&["--frobnicate"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["verify", "generate"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["--seed"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["--checkpoints", "3,1"]), Err(CliError::Usage(_))));
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn help_ignores_a_broken_environment() {
        assert!(bad_env().is_err());
        assert!(parse_args(args(&["--help"]), bad_env).unwrap().is_none());
        assert!(parse_args(args(&["render", "3", "-h"]), bad_env).unwrap().is_none());
    }

    #[test]
    fn broken_environment_fails_real_commands() {
        assert!(matches!(
            parse_args(args(&["verify"]), bad_env),
            Err(CliError::Harness(HarnessError::Config(_)))
        ));
    }

    #[test]
    fn flags_beat_environment() {
        let env = || {
            ParityConfig::from_lookup(|name| (name == "FLAMEGRID_SEED").then(|| "9".to_string()))
        };
        let args_env = parse_args(args(&[]), env).unwrap().unwrap();
        assert_eq!(args_env.config.seed, 9);
        let args_flag = parse_args(args(&["--seed", "7"]), env).unwrap().unwrap();
        assert_eq!(args_flag.config.seed, 7);
    }

    #[test]
    fn wall_clock_flag_selects_real_time() {
        assert!(!parse(&["render", "5"]).unwrap().unwrap().wall_clock);
        assert!(parse(&["render", "5", "--wall-clock"]).unwrap().unwrap().wall_clock);
    }

    #[test]
    fn wall_clock_render_completes() {
        assert!(render(42, Viewport::new(200.0, 160.0, 1.0), 2, true).is_ok());
    }

    #[test]
    fn unwritable_log_keeps_the_verdict() {
        let passing = ParityReport {
            cols: 80,
            rows: 32,
            seed: 42,
            outcomes: Vec::new(),
        };
        assert_eq!(conclude(&passing, Err(io::Error::other("read-only"))), 0);
        assert_eq!(conclude(&passing, Ok(ParityLog::noop())), 0);
    }
}

//! Single-threaded frame scheduler.
//!
//! [`FrameScheduler`] is the one controller object for a running grid: it
//! owns the engine, the surface, the renderer, the current layout, the pause
//! flag and the pending-resize debouncer. The host calls
//! [`tick`](FrameScheduler::tick) once per frame and
//! [`request_resize`](FrameScheduler::request_resize) /
//! [`toggle_pause`](FrameScheduler::toggle_pause) from its event handlers.
//!
//! # Tick order
//!
//! 1. Fire a due resize (re-derive layout, resize surface, resize engine).
//!    This happens even while paused.
//! 2. If paused, return [`TickOutcome::Idle`].
//! 3. Step the engine once, snapshot it, render the snapshot.
//!
//! A tick is a non-interruptible unit: `&mut self` guarantees no other
//! operation observes the scheduler halfway through one.

use std::fmt;
use std::time::Duration;

use flamegrid_core::{
    CellMetrics, GridEngine, GridLayout, SizingPolicy, SnapshotError, Viewport,
};
use flamegrid_render::{BatchRenderer, RenderStats, Surface};
use tracing::{debug, info_span, trace};

use crate::debounce::Debouncer;

/// Quiescence window applied to resize bursts.
pub const DEFAULT_RESIZE_QUIESCENCE: Duration = Duration::from_millis(150);

/// Scheduler tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// How long the viewport must stay unchanged before the grid is rebuilt.
    pub resize_quiescence: Duration,
    pub sizing: SizingPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            resize_quiescence: DEFAULT_RESIZE_QUIESCENCE,
            sizing: SizingPolicy::default(),
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub fn with_resize_quiescence(mut self, quiescence: Duration) -> Self {
        self.resize_quiescence = quiescence;
        self
    }

    #[must_use]
    pub fn with_sizing(mut self, sizing: SizingPolicy) -> Self {
        self.sizing = sizing;
        self
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Paused: nothing was stepped or drawn.
    Idle,
    /// The engine advanced one step and the frame was drawn.
    Rendered(RenderStats),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The engine's buffers could not be viewed as a grid.
    Snapshot(SnapshotError),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot(e) => write!(f, "cannot snapshot engine grid: {e}"),
        }
    }
}

impl std::error::Error for SchedulerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Snapshot(e) => Some(e),
        }
    }
}

impl From<SnapshotError> for SchedulerError {
    fn from(e: SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}

/// Controller that drives an engine onto a surface, one tick at a time.
#[derive(Debug)]
pub struct FrameScheduler<E, S> {
    engine: E,
    surface: S,
    renderer: BatchRenderer,
    config: SchedulerConfig,
    layout: Option<GridLayout>,
    paused: bool,
    resize: Debouncer<Viewport>,
    frames_rendered: u64,
}

impl<E: GridEngine, S: Surface> FrameScheduler<E, S> {
    /// Wrap `engine` and `surface`. Call [`start`](Self::start) before the
    /// first tick.
    pub fn new(engine: E, surface: S, config: SchedulerConfig) -> Self {
        let resize = Debouncer::new(config.resize_quiescence);
        Self {
            engine,
            surface,
            // Replaced by the first layout.
            renderer: BatchRenderer::new(CellMetrics {
                width: 0,
                height: 0,
            }),
            config,
            layout: None,
            paused: false,
            resize,
            frames_rendered: 0,
        }
    }

    /// Size the grid for `viewport` and initialize the engine with its
    /// default seed.
    pub fn start(&mut self, viewport: Viewport) -> GridLayout {
        let layout = self.adopt(viewport);
        self.engine.init(layout.cols, layout.rows);
        layout
    }

    /// Like [`start`](Self::start) but with a fixed seed, for reproducible
    /// headless runs.
    pub fn start_seeded(&mut self, viewport: Viewport, seed: u32) -> GridLayout {
        let layout = self.adopt(viewport);
        self.engine.init_seeded(layout.cols, layout.rows, seed);
        layout
    }

    /// Run one frame.
    pub fn tick(&mut self, now: Duration) -> Result<TickOutcome, SchedulerError> {
        self.poll_resize(now);

        if self.paused {
            return Ok(TickOutcome::Idle);
        }

        let _span = info_span!("tick", frame = self.frames_rendered).entered();
        self.engine.step();
        let snapshot = self.engine.snapshot()?;
        let stats = self.renderer.render(&snapshot, &mut self.surface);
        self.frames_rendered += 1;
        trace!(
            fill_switches = stats.fill_switches,
            rects = stats.rects,
            glyphs = stats.glyphs,
            "frame rendered"
        );
        Ok(TickOutcome::Rendered(stats))
    }

    /// Record a viewport change. Only the last request of a burst is
    /// applied, once the quiescence window has passed without another.
    pub fn request_resize(&mut self, viewport: Viewport, now: Duration) {
        if self.resize.schedule(viewport, now) {
            trace!("pending resize superseded");
        }
    }

    /// Apply a pending resize if it is due. Returns the new layout when one
    /// was applied. [`tick`](Self::tick) calls this first.
    pub fn poll_resize(&mut self, now: Duration) -> Option<GridLayout> {
        let viewport = self.resize.poll(now)?;
        let layout = self.adopt(viewport);
        self.engine.resize(layout.cols, layout.rows);
        Some(layout)
    }

    /// Flip the pause flag and return the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            debug!(paused, "pause toggled");
        }
        self.paused = paused;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Layout currently in effect, `None` before [`start`](Self::start).
    #[must_use]
    pub fn layout(&self) -> Option<GridLayout> {
        self.layout
    }

    #[must_use]
    pub fn has_pending_resize(&self) -> bool {
        self.resize.is_pending()
    }

    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Tear down, returning the engine and surface.
    pub fn into_parts(self) -> (E, S) {
        (self.engine, self.surface)
    }

    fn adopt(&mut self, viewport: Viewport) -> GridLayout {
        self.resize.cancel();
        let layout = self.config.sizing.layout(viewport);
        self.surface.apply_layout(&layout);
        self.renderer.set_cell_metrics(layout.cell);
        self.layout = Some(layout);
        debug!(
            cols = layout.cols,
            rows = layout.rows,
            cell_w = layout.cell.width,
            cell_h = layout.cell.height,
            "layout applied"
        );
        layout
    }
}

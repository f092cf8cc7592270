//! Boundary between flamegrid and a grid-producing simulation engine.
//!
//! The engine owns its buffers. Consumers only ever see them through
//! [`GridEngine::snapshot`], whose borrow ends before the next
//! [`GridEngine::step`] or [`GridEngine::resize`] can run.

use crate::snapshot::{GridSnapshot, SnapshotError};

/// A deterministic, externally supplied grid simulation.
pub trait GridEngine {
    /// Allocate or reset a `cols × rows` grid with default-seeded content.
    fn init(&mut self, cols: u16, rows: u16);

    /// Like [`init`](Self::init) but fully determined by `seed`.
    fn init_seeded(&mut self, cols: u16, rows: u16, seed: u32);

    /// Reallocate to new dimensions, discarding the previous grid.
    fn resize(&mut self, cols: u16, rows: u16);

    /// Advance exactly one step, mutating the grid in place.
    fn step(&mut self);

    fn width(&self) -> u16;

    fn height(&self) -> u16;

    /// Row-major codepoints, `width * height` long.
    fn chars(&self) -> &[u32];

    /// Row-major attribute words, `width * height` long.
    fn attrs(&self) -> &[u32];

    /// Borrow the current grid as a checked snapshot.
    fn snapshot(&self) -> Result<GridSnapshot<'_>, SnapshotError> {
        GridSnapshot::new(self.width(), self.height(), self.chars(), self.attrs())
    }
}

/// Test hooks that expose the engine's own attribute encoder.
pub trait AttrProbe {
    /// Select ANSI foreground/background for subsequent drawing.
    fn set_color_ansi(&mut self, fg: u8, bg: u8);

    /// The attribute word the engine would currently write.
    fn current_attr(&self) -> u32;
}

impl<E: GridEngine + ?Sized> GridEngine for Box<E> {
    fn init(&mut self, cols: u16, rows: u16) {
        (**self).init(cols, rows);
    }

    fn init_seeded(&mut self, cols: u16, rows: u16, seed: u32) {
        (**self).init_seeded(cols, rows, seed);
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        (**self).resize(cols, rows);
    }

    fn step(&mut self) {
        (**self).step();
    }

    fn width(&self) -> u16 {
        (**self).width()
    }

    fn height(&self) -> u16 {
        (**self).height()
    }

    fn chars(&self) -> &[u32] {
        (**self).chars()
    }

    fn attrs(&self) -> &[u32] {
        (**self).attrs()
    }
}

//! Two-pass, color-coalescing snapshot renderer.
//!
//! Pass order is fixed:
//!
//! 1. Clear the whole surface to black.
//! 2. **Background pass**: fill every cell whose background is a palette
//!    index in `1..16`. Index 0 and extended values are transparent.
//! 3. **Foreground pass**: paint every cell whose codepoint is above `0x20`.
//!    Extended foregrounds fall back to light gray (index 7).
//!
//! Each pass keeps its own "last color" cache, reset at the start of the
//! pass, and only calls [`Surface::set_fill`] when the index changes. All
//! backgrounds are committed before the first glyph.

use flamegrid_core::palette::{ANSI_PALETTE, DEFAULT_FG_INDEX};
use flamegrid_core::{CellMetrics, ColorField, GridSnapshot, Rgb};

use crate::surface::{PixelRect, Surface};

/// Highest codepoint that never produces a glyph (space and controls).
pub const BLANK_CODEPOINT_MAX: u32 = 0x20;

/// Counters for one [`BatchRenderer::render`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// `set_fill` calls issued by the two passes (the clear is excluded).
    pub fill_switches: u32,
    /// Background rectangles filled.
    pub rects: u32,
    /// Glyphs painted.
    pub glyphs: u32,
}

/// Last palette index applied within one pass.
#[derive(Debug, Default)]
struct PassCache {
    last: Option<u8>,
}

impl PassCache {
    /// Record `index` as active; returns true when the surface color must
    /// change.
    #[inline]
    fn switch_to(&mut self, index: u8) -> bool {
        if self.last == Some(index) {
            return false;
        }
        self.last = Some(index);
        true
    }
}

/// Background index to draw, or `None` for a transparent cell.
#[inline]
#[must_use]
pub fn background_index(bg: u16) -> Option<u8> {
    match ColorField::classify(bg) {
        ColorField::Ansi(0) | ColorField::Extended(_) => None,
        ColorField::Ansi(idx) => Some(idx),
    }
}

/// Foreground index to paint with, substituting the default for extended
/// values.
#[inline]
#[must_use]
pub fn foreground_index(fg: u16) -> u8 {
    ColorField::classify(fg).ansi().unwrap_or(DEFAULT_FG_INDEX)
}

#[inline]
fn palette(index: u8) -> Rgb {
    // Callers only pass indices produced by `background_index` /
    // `foreground_index`, both below 16.
    ANSI_PALETTE[usize::from(index & 0x0f)]
}

/// Renders [`GridSnapshot`]s onto a [`Surface`] using fixed cell metrics.
#[derive(Debug, Clone)]
pub struct BatchRenderer {
    cell: CellMetrics,
}

impl BatchRenderer {
    #[must_use]
    pub const fn new(cell: CellMetrics) -> Self {
        Self { cell }
    }

    #[must_use]
    pub const fn cell_metrics(&self) -> CellMetrics {
        self.cell
    }

    /// Change cell metrics, e.g. after a viewport resize.
    pub fn set_cell_metrics(&mut self, cell: CellMetrics) {
        self.cell = cell;
    }

    /// Paint one snapshot.
    ///
    /// Never fails: out-of-palette indices are degraded, not rejected.
    pub fn render<S: Surface + ?Sized>(
        &self,
        snapshot: &GridSnapshot<'_>,
        surface: &mut S,
    ) -> RenderStats {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "render",
            width = snapshot.width(),
            height = snapshot.height()
        )
        .entered();

        let mut stats = RenderStats::default();

        let (surface_w, surface_h) = surface.size_px();
        surface.set_fill(Rgb::BLACK);
        surface.fill_rect(PixelRect::new(0, 0, surface_w, surface_h));

        self.background_pass(snapshot, surface, &mut stats);
        self.foreground_pass(snapshot, surface, &mut stats);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            fill_switches = stats.fill_switches,
            rects = stats.rects,
            glyphs = stats.glyphs,
            "snapshot rendered"
        );

        stats
    }

    fn background_pass<S: Surface + ?Sized>(
        &self,
        snapshot: &GridSnapshot<'_>,
        surface: &mut S,
        stats: &mut RenderStats,
    ) {
        let mut cache = PassCache::default();
        for (x, y, _, attr) in snapshot.cells() {
            let Some(bg) = background_index(attr.bg()) else {
                continue;
            };
            if cache.switch_to(bg) {
                surface.set_fill(palette(bg));
                stats.fill_switches += 1;
            }
            let (px, py) = self.origin(x, y);
            surface.fill_rect(PixelRect::new(px, py, self.cell.width, self.cell.height));
            stats.rects += 1;
        }
    }

    fn foreground_pass<S: Surface + ?Sized>(
        &self,
        snapshot: &GridSnapshot<'_>,
        surface: &mut S,
        stats: &mut RenderStats,
    ) {
        let mut cache = PassCache::default();
        for (x, y, codepoint, attr) in snapshot.cells() {
            if codepoint <= BLANK_CODEPOINT_MAX {
                continue;
            }
            let fg = foreground_index(attr.fg());
            if cache.switch_to(fg) {
                surface.set_fill(palette(fg));
                stats.fill_switches += 1;
            }
            let (px, py) = self.origin(x, y);
            surface.fill_glyph(codepoint, px, py);
            stats.glyphs += 1;
        }
    }

    #[inline]
    fn origin(&self, x: u16, y: u16) -> (u32, u32) {
        (
            u32::from(x) * self.cell.width,
            u32::from(y) * self.cell.height,
        )
    }
}

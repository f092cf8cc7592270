//! Viewport → grid sizing policy.
//!
//! Cell size scales with the device pixel ratio so glyphs stay sharp; grid
//! dimensions fill the viewport in device pixels. Minimums keep the engine
//! away from degenerate grids.

/// Physical viewport as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in CSS (logical) pixels.
    pub width: f64,
    /// Height in CSS (logical) pixels.
    pub height: f64,
    /// Device pixel ratio.
    pub dpr: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64, dpr: f64) -> Self {
        Self { width, height, dpr }
    }

    /// Device pixel ratio with missing/invalid values mapped to 1.
    #[must_use]
    pub fn effective_dpr(&self) -> f64 {
        if self.dpr.is_finite() && self.dpr > 0.0 {
            self.dpr
        } else {
            1.0
        }
    }
}

/// Size of one cell in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMetrics {
    pub width: u32,
    pub height: u32,
}

/// Result of applying a [`SizingPolicy`] to a [`Viewport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub cols: u16,
    pub rows: u16,
    pub cell: CellMetrics,
    /// Monospace font size in device pixels.
    pub font_px: u32,
}

impl GridLayout {
    /// Drawing surface size in device pixels, saturating at `u32::MAX`.
    #[must_use]
    pub fn surface_size_px(&self) -> (u32, u32) {
        (
            u32::from(self.cols).saturating_mul(self.cell.width),
            u32::from(self.rows).saturating_mul(self.cell.height),
        )
    }
}

/// Tunables for grid sizing. [`Default`] is the reference policy.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingPolicy {
    /// Cell height at dpr 1, in pixels.
    pub base_cell_height: f64,
    /// Lower bound for the scaled cell height.
    pub min_cell_height: u32,
    /// Cell width as a fraction of cell height.
    pub cell_aspect: f64,
    pub min_cols: u16,
    pub min_rows: u16,
    /// Font size as a fraction of cell height.
    pub font_scale: f64,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            base_cell_height: 16.0,
            min_cell_height: 10,
            cell_aspect: 0.6,
            min_cols: 20,
            min_rows: 10,
            font_scale: 0.85,
        }
    }
}

impl SizingPolicy {
    #[must_use]
    pub fn with_base_cell_height(mut self, px: f64) -> Self {
        self.base_cell_height = px;
        self
    }

    #[must_use]
    pub fn with_min_grid(mut self, cols: u16, rows: u16) -> Self {
        self.min_cols = cols;
        self.min_rows = rows;
        self
    }

    /// Derive grid dimensions and cell size for `viewport`.
    ///
    /// ```
    /// use flamegrid_core::{SizingPolicy, Viewport};
    ///
    /// let layout = SizingPolicy::default().layout(Viewport::new(1000.0, 500.0, 1.0));
    /// assert_eq!((layout.cols, layout.rows), (100, 31));
    /// assert_eq!((layout.cell.width, layout.cell.height), (10, 16));
    /// ```
    #[must_use]
    pub fn layout(&self, viewport: Viewport) -> GridLayout {
        let dpr = viewport.effective_dpr();

        let cell_h = clamp_u32((self.base_cell_height * dpr).round()).max(self.min_cell_height);
        // A zero-width cell would divide by zero below.
        let cell_w = clamp_u32((f64::from(cell_h) * self.cell_aspect).round()).max(1);

        let cols = fit(viewport.width * dpr, cell_w).max(self.min_cols);
        let rows = fit(viewport.height * dpr, cell_h).max(self.min_rows);

        let font_px = clamp_u32((f64::from(cell_h) * self.font_scale).round()).max(1);

        #[cfg(feature = "tracing")]
        tracing::debug!(cols, rows, cell_w, cell_h, dpr, "grid layout derived");

        GridLayout {
            cols,
            rows,
            cell: CellMetrics {
                width: cell_w,
                height: cell_h,
            },
            font_px,
        }
    }
}

fn clamp_u32(v: f64) -> u32 {
    if v.is_nan() || v <= 0.0 {
        0
    } else if v >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        v as u32
    }
}

/// Number of whole cells of size `cell` that fit in `extent` pixels.
fn fit(extent: f64, cell: u32) -> u16 {
    if !extent.is_finite() || extent <= 0.0 {
        return 0;
    }
    let n = (extent / f64::from(cell)).floor();
    if n >= f64::from(u16::MAX) {
        u16::MAX
    } else {
        n as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(w: f64, h: f64, dpr: f64) -> GridLayout {
        SizingPolicy::default().layout(Viewport::new(w, h, dpr))
    }

    #[test]
    fn reference_viewport_at_dpr_one() {
        let l = layout(1000.0, 500.0, 1.0);
        assert_eq!(l.cell, CellMetrics { width: 10, height: 16 });
        assert_eq!((l.cols, l.rows), (100, 31));
        assert_eq!(l.font_px, 14);
        assert_eq!(l.surface_size_px(), (1000, 496));
    }

    #[test]
    fn retina_doubles_cell_size() {
        let l = layout(1000.0, 500.0, 2.0);
        assert_eq!(l.cell, CellMetrics { width: 19, height: 32 });
        assert_eq!((l.cols, l.rows), (105, 31));
    }

    #[test]
    fn small_dpr_hits_minimum_cell_height() {
        let l = layout(800.0, 600.0, 0.25);
        assert_eq!(l.cell.height, 10);
        assert_eq!(l.cell.width, 6);
    }

    #[test]
    fn tiny_viewport_hits_minimum_grid() {
        let l = layout(10.0, 10.0, 1.0);
        assert_eq!((l.cols, l.rows), (20, 10));
    }

    #[test]
    fn invalid_dpr_falls_back_to_one() {
        assert_eq!(layout(1000.0, 500.0, 0.0), layout(1000.0, 500.0, 1.0));
        assert_eq!(layout(1000.0, 500.0, f64::NAN), layout(1000.0, 500.0, 1.0));
        assert_eq!(layout(1000.0, 500.0, -3.0), layout(1000.0, 500.0, 1.0));
    }

    #[test]
    fn absurd_dpr_saturates_surface_size() {
        let l = layout(10.0, 10.0, 1.0e8);
        assert_eq!((l.cols, l.rows), (20, 10));
        assert_eq!(l.surface_size_px(), (u32::MAX, u32::MAX));
    }

    #[test]
    fn fractional_dpr_rounds_half_up() {
        // 16 * 1.5 = 24, 24 * 0.6 = 14.4 -> 14
        let l = layout(1400.0, 700.0, 1.5);
        assert_eq!(l.cell, CellMetrics { width: 14, height: 24 });
        assert_eq!((l.cols, l.rows), (150, 43));
    }
}

//! Pixel surface abstraction.
//!
//! Modeled on a Canvas2D context: one active fill color shared by rectangle
//! fills and glyph paints, integer device-pixel coordinates, glyphs anchored
//! at their cell's top-left corner.

use flamegrid_core::{GridLayout, Rgb};

/// Axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// A drawing target sized in device pixels.
pub trait Surface {
    /// Current size as `(width, height)`.
    fn size_px(&self) -> (u32, u32);

    /// Reallocate to a new size. Contents are unspecified afterwards.
    fn resize_px(&mut self, width: u32, height: u32);

    /// Set the active fill color.
    fn set_fill(&mut self, color: Rgb);

    /// Fill `rect` with the active color.
    fn fill_rect(&mut self, rect: PixelRect);

    /// Paint `codepoint` with its top-left corner at `(x, y)` in the active
    /// color.
    fn fill_glyph(&mut self, codepoint: u32, x: u32, y: u32);

    /// Adopt a new grid layout before the next frame.
    ///
    /// The default resizes to [`GridLayout::surface_size_px`]. Surfaces with
    /// font or glyph state override this to pick up `font_px` and cell size.
    fn apply_layout(&mut self, layout: &GridLayout) {
        let (width, height) = layout.surface_size_px();
        self.resize_px(width, height);
    }
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn size_px(&self) -> (u32, u32) {
        (**self).size_px()
    }

    fn resize_px(&mut self, width: u32, height: u32) {
        (**self).resize_px(width, height);
    }

    fn set_fill(&mut self, color: Rgb) {
        (**self).set_fill(color);
    }

    fn fill_rect(&mut self, rect: PixelRect) {
        (**self).fill_rect(rect);
    }

    fn fill_glyph(&mut self, codepoint: u32, x: u32, y: u32) {
        (**self).fill_glyph(codepoint, x, y);
    }

    fn apply_layout(&mut self, layout: &GridLayout) {
        (**self).apply_layout(layout);
    }
}

/// One recorded surface call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOp {
    SetFill(Rgb),
    FillRect(PixelRect),
    FillGlyph { codepoint: u32, x: u32, y: u32 },
}

/// Surface that records every call instead of drawing.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Recorded calls in issue order.
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain recorded calls.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Replay the recording, pairing each fill/glyph with the color that was
    /// active when it was issued.
    pub fn resolved(&self) -> impl Iterator<Item = (Option<Rgb>, DrawOp)> + '_ {
        let mut active = None;
        self.ops.iter().filter_map(move |op| match *op {
            DrawOp::SetFill(color) => {
                active = Some(color);
                None
            }
            other => Some((active, other)),
        })
    }
}

impl Surface for RecordingSurface {
    fn size_px(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize_px(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn set_fill(&mut self, color: Rgb) {
        self.ops.push(DrawOp::SetFill(color));
    }

    fn fill_rect(&mut self, rect: PixelRect) {
        self.ops.push(DrawOp::FillRect(rect));
    }

    fn fill_glyph(&mut self, codepoint: u32, x: u32, y: u32) {
        self.ops.push(DrawOp::FillGlyph { codepoint, x, y });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_pairs_ops_with_active_color() {
        let mut s = RecordingSurface::new(4, 4);
        s.fill_rect(PixelRect::new(0, 0, 1, 1));
        s.set_fill(Rgb::new(1, 2, 3));
        s.fill_glyph(0x41, 0, 0);
        s.set_fill(Rgb::BLACK);
        s.fill_rect(PixelRect::new(1, 1, 2, 2));

        let resolved: Vec<_> = s.resolved().collect();
        assert_eq!(
            resolved,
            vec![
                (None, DrawOp::FillRect(PixelRect::new(0, 0, 1, 1))),
                (
                    Some(Rgb::new(1, 2, 3)),
                    DrawOp::FillGlyph {
                        codepoint: 0x41,
                        x: 0,
                        y: 0
                    }
                ),
                (Some(Rgb::BLACK), DrawOp::FillRect(PixelRect::new(1, 1, 2, 2))),
            ]
        );
    }

    fn drive<S: Surface>(mut surface: S) {
        surface.set_fill(Rgb::BLACK);
        surface.resize_px(8, 9);
    }

    #[test]
    fn mutable_reference_forwards() {
        let mut s = RecordingSurface::new(2, 2);
        drive(&mut s);
        assert_eq!(s.size_px(), (8, 9));
        assert_eq!(s.ops(), &[DrawOp::SetFill(Rgb::BLACK)]);
    }
}

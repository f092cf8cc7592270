//! Software RGBA8 surface.
//!
//! Used for headless runs and tests. Rectangles are clipped to the buffer.
//! Glyphs are stamped from a deterministic procedural mask derived from the
//! codepoint; there is no font rasterization.

use flamegrid_core::{CellMetrics, GridLayout, Rgb};

use crate::surface::{PixelRect, Surface};

/// Row-major RGBA8 pixel buffer.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    fill: [u8; 4],
    glyph: CellMetrics,
}

impl Framebuffer {
    /// Create a black buffer. `glyph` is the size of the stamped glyph mask,
    /// normally the cell size.
    #[must_use]
    pub fn new(width: u32, height: u32, glyph: CellMetrics) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; buffer_len(width, height)],
            fill: Rgb::BLACK.to_rgba_u32().to_be_bytes(),
            glyph,
        }
    }

    /// Raw RGBA8 bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// FNV-1a 64 over the dimensions and pixel bytes. Stable across
    /// platforms, for comparing headless runs.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let mut hash = FNV64_OFFSET_BASIS;
        hash = fnv1a64_extend(hash, &self.width.to_le_bytes());
        hash = fnv1a64_extend(hash, &self.height.to_le_bytes());
        fnv1a64_extend(hash, &self.pixels)
    }

    /// Color at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(Rgb::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
        ))
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    #[inline]
    fn put(&mut self, x: u32, y: u32) {
        let i = self.offset(x, y);
        self.pixels[i..i + 4].copy_from_slice(&self.fill);
    }
}

const FNV64_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV64_PRIME: u64 = 0x100000001b3;

fn fnv1a64_extend(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV64_PRIME);
    }
    hash
}

fn buffer_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * 4
}

/// Whether the procedural glyph for `codepoint` covers `(x, y)` of a
/// `w × h` mask.
#[must_use]
pub fn glyph_mask_bit(codepoint: u32, x: u32, y: u32, w: u32, h: u32) -> bool {
    let seed = codepoint.wrapping_mul(0x9E37_79B9) ^ (w << 16) ^ h;
    let border = x == 0 || y == 0 || x + 1 == w || y + 1 == h;
    let bit_index = (x + y * 7) & 31;
    let hash_bit = ((seed >> bit_index) & 1) == 1;
    let stripe = (x.wrapping_mul(3).wrapping_add(y).wrapping_add(seed) % 11) == 0;
    let dot = (x.wrapping_add(y.wrapping_mul(5)).wrapping_add(seed) % 17) == 0;
    border || (hash_bit && stripe) || dot
}

impl Surface for Framebuffer {
    fn size_px(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize_px(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(buffer_len(width, height), 0);
    }

    fn apply_layout(&mut self, layout: &GridLayout) {
        let (width, height) = layout.surface_size_px();
        self.resize_px(width, height);
        self.glyph = layout.cell;
    }

    fn set_fill(&mut self, color: Rgb) {
        self.fill = color.to_rgba_u32().to_be_bytes();
    }

    fn fill_rect(&mut self, rect: PixelRect) {
        let x1 = rect.x.saturating_add(rect.w).min(self.width);
        let y1 = rect.y.saturating_add(rect.h).min(self.height);
        for y in rect.y..y1 {
            for x in rect.x..x1 {
                self.put(x, y);
            }
        }
    }

    fn fill_glyph(&mut self, codepoint: u32, x: u32, y: u32) {
        // Inset by one pixel so neighbouring glyphs never touch.
        let w = self.glyph.width.saturating_sub(2).max(1);
        let h = self.glyph.height.saturating_sub(2).max(1);
        for gy in 0..h {
            let py = y.saturating_add(gy + 1);
            if py >= self.height {
                break;
            }
            for gx in 0..w {
                let px = x.saturating_add(gx + 1);
                if px >= self.width {
                    break;
                }
                if glyph_mask_bit(codepoint, gx, gy, w, h) {
                    self.put(px, py);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: CellMetrics = CellMetrics {
        width: 6,
        height: 8,
    };

    #[test]
    fn starts_black_and_opaque_after_fill() {
        let mut fb = Framebuffer::new(4, 3, CELL);
        assert_eq!(fb.pixel(3, 2), Some(Rgb::BLACK));
        fb.set_fill(Rgb::new(1, 2, 3));
        fb.fill_rect(PixelRect::new(0, 0, 4, 3));
        assert_eq!(fb.pixel(0, 0), Some(Rgb::new(1, 2, 3)));
        assert_eq!(fb.pixels()[3], 0xff);
    }

    #[test]
    fn filled_pixels_hold_packed_rgba_bytes() {
        let color = Rgb::new(0x55, 0xaa, 0xff);
        let mut fb = Framebuffer::new(2, 1, CELL);
        fb.set_fill(color);
        fb.fill_rect(PixelRect::new(1, 0, 1, 1));
        assert_eq!(&fb.pixels()[4..8], &color.to_rgba_u32().to_be_bytes());
        assert_eq!(&fb.pixels()[4..8], &[0x55, 0xaa, 0xff, 0xff]);
        assert_eq!(&fb.pixels()[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn rects_are_clipped() {
        let mut fb = Framebuffer::new(4, 4, CELL);
        fb.set_fill(Rgb::new(9, 9, 9));
        fb.fill_rect(PixelRect::new(2, 2, 100, 100));
        assert_eq!(fb.pixel(3, 3), Some(Rgb::new(9, 9, 9)));
        assert_eq!(fb.pixel(1, 1), Some(Rgb::BLACK));
        assert_eq!(fb.pixel(4, 4), None);
    }

    #[test]
    fn glyph_border_is_inset_by_one_pixel() {
        let mut fb = Framebuffer::new(6, 8, CELL);
        fb.set_fill(Rgb::new(0xff, 0, 0));
        fb.fill_glyph('A' as u32, 0, 0);
        assert_eq!(fb.pixel(0, 0), Some(Rgb::BLACK));
        assert_eq!(fb.pixel(1, 1), Some(Rgb::new(0xff, 0, 0)));
        assert_eq!(fb.pixel(4, 6), Some(Rgb::new(0xff, 0, 0)));
        assert_eq!(fb.pixel(5, 7), Some(Rgb::BLACK));
    }

    #[test]
    fn glyph_mask_always_draws_its_outline() {
        for cp in ['#' as u32, '$' as u32, 0x2588] {
            for x in 0..4 {
                assert!(glyph_mask_bit(cp, x, 0, 4, 6));
                assert!(glyph_mask_bit(cp, x, 5, 4, 6));
            }
            for y in 0..6 {
                assert!(glyph_mask_bit(cp, 0, y, 4, 6));
                assert!(glyph_mask_bit(cp, 3, y, 4, 6));
            }
        }
    }

    #[test]
    fn resize_reallocates_black() {
        let mut fb = Framebuffer::new(2, 2, CELL);
        fb.set_fill(Rgb::new(5, 5, 5));
        fb.fill_rect(PixelRect::new(0, 0, 2, 2));
        fb.resize_px(3, 1);
        assert_eq!(fb.size_px(), (3, 1));
        assert_eq!(fb.pixels().len(), 12);
        assert_eq!(fb.pixel(2, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn apply_layout_resizes_and_adopts_cell_size() {
        let mut fb = Framebuffer::new(1, 1, CELL);
        let layout = GridLayout {
            cols: 3,
            rows: 2,
            cell: CellMetrics {
                width: 10,
                height: 16,
            },
            font_px: 14,
        };
        fb.apply_layout(&layout);
        assert_eq!(fb.size_px(), (30, 32));
        assert_eq!(fb.pixels().len(), 30 * 32 * 4);

        // A 10x16 cell stamps an 8x14 mask at (1, 1).
        fb.set_fill(Rgb::new(5, 5, 5));
        fb.fill_glyph('#' as u32, 0, 0);
        assert_eq!(fb.pixel(8, 14), Some(Rgb::new(5, 5, 5)));
        assert_eq!(fb.pixel(9, 15), Some(Rgb::BLACK));
    }

    #[test]
    fn checksum_tracks_content_and_size() {
        let a = Framebuffer::new(4, 4, CELL);
        let mut b = Framebuffer::new(4, 4, CELL);
        assert_eq!(a.checksum(), b.checksum());
        assert_ne!(a.checksum(), Framebuffer::new(8, 2, CELL).checksum());

        b.set_fill(Rgb::new(0, 0, 1));
        b.fill_rect(PixelRect::new(3, 3, 1, 1));
        assert_ne!(a.checksum(), b.checksum());
    }
}

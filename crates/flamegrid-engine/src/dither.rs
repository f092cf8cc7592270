//! Heat → character cell dithering.
//!
//! Each heat value (0..=255) has a color from the fire palette. Every color
//! is matched once, at construction, against all `bg × fg × density`
//! mixtures the 16-color ANSI palette can show with the character ramp; the
//! best match becomes that heat's cell. Per frame, a 4×4 ordered (Bayer)
//! offset perturbs the heat before lookup so gradients break up into
//! texture instead of flat bands.

use flamegrid_core::{ANSI_PALETTE, Attr, Rgb};

/// Character ramp from empty to full coverage.
pub const RAMP: [char; 9] = [' ', '.', ':', ';', 't', '%', 'S', 'X', '@'];

const BAYER4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// Fire palette: 256 heat levels, 6 bits per channel.
#[rustfmt::skip]
const HEAT_PALETTE: [[u8; 3]; 256] = [
    [0, 0, 0], [0, 0, 6], [0, 0, 6], [0, 0, 7], [0, 0, 8], [0, 0, 8],
    [0, 0, 9], [0, 0, 10], [2, 0, 10], [4, 0, 9], [6, 0, 9], [8, 0, 8],
    [10, 0, 7], [12, 0, 7], [14, 0, 6], [16, 0, 5], [18, 0, 5], [20, 0, 4],
    [22, 0, 4], [24, 0, 3], [26, 0, 2], [28, 0, 2], [30, 0, 1], [32, 0, 0],
    [32, 0, 0], [33, 0, 0], [34, 0, 0], [35, 0, 0], [36, 0, 0], [36, 0, 0],
    [37, 0, 0], [38, 0, 0], [39, 0, 0], [40, 0, 0], [40, 0, 0], [41, 0, 0],
    [42, 0, 0], [43, 0, 0], [44, 0, 0], [45, 0, 0], [46, 1, 0], [47, 1, 0],
    [48, 2, 0], [49, 2, 0], [50, 3, 0], [51, 3, 0], [52, 4, 0], [53, 4, 0],
    [54, 5, 0], [55, 5, 0], [56, 6, 0], [57, 6, 0], [58, 7, 0], [59, 7, 0],
    [60, 8, 0], [61, 8, 0], [63, 9, 0], [63, 9, 0], [63, 10, 0], [63, 10, 0],
    [63, 11, 0], [63, 11, 0], [63, 12, 0], [63, 12, 0], [63, 13, 0], [63, 13, 0],
    [63, 14, 0], [63, 14, 0], [63, 15, 0], [63, 15, 0], [63, 16, 0], [63, 16, 0],
    [63, 17, 0], [63, 17, 0], [63, 18, 0], [63, 18, 0], [63, 19, 0], [63, 19, 0],
    [63, 20, 0], [63, 20, 0], [63, 21, 0], [63, 21, 0], [63, 22, 0], [63, 22, 0],
    [63, 23, 0], [63, 24, 0], [63, 24, 0], [63, 25, 0], [63, 25, 0], [63, 26, 0],
    [63, 26, 0], [63, 27, 0], [63, 27, 0], [63, 28, 0], [63, 28, 0], [63, 29, 0],
    [63, 29, 0], [63, 30, 0], [63, 30, 0], [63, 31, 0], [63, 31, 0], [63, 32, 0],
    [63, 32, 0], [63, 33, 0], [63, 33, 0], [63, 34, 0], [63, 34, 0], [63, 35, 0],
    [63, 35, 0], [63, 36, 0], [63, 36, 0], [63, 37, 0], [63, 38, 0], [63, 38, 0],
    [63, 39, 0], [63, 39, 0], [63, 40, 0], [63, 40, 0], [63, 41, 0], [63, 41, 0],
    [63, 42, 0], [63, 42, 0], [63, 43, 0], [63, 43, 0], [63, 44, 0], [63, 44, 0],
    [63, 45, 0], [63, 45, 0], [63, 46, 0], [63, 46, 0], [63, 47, 0], [63, 47, 0],
    [63, 48, 0], [63, 48, 0], [63, 49, 0], [63, 49, 0], [63, 50, 0], [63, 50, 0],
    [63, 51, 0], [63, 52, 0], [63, 52, 0], [63, 52, 0], [63, 52, 0], [63, 52, 0],
    [63, 53, 0], [63, 53, 0], [63, 53, 0], [63, 53, 0], [63, 54, 0], [63, 54, 0],
    [63, 54, 0], [63, 54, 0], [63, 54, 0], [63, 55, 0], [63, 55, 0], [63, 55, 0],
    [63, 55, 0], [63, 56, 0], [63, 56, 0], [63, 56, 0], [63, 56, 0], [63, 57, 0],
    [63, 57, 0], [63, 57, 0], [63, 57, 0], [63, 57, 0], [63, 58, 0], [63, 58, 0],
    [63, 58, 0], [63, 58, 0], [63, 59, 0], [63, 59, 0], [63, 59, 0], [63, 59, 0],
    [63, 60, 0], [63, 60, 0], [63, 60, 0], [63, 60, 0], [63, 60, 0], [63, 61, 0],
    [63, 61, 0], [63, 61, 0], [63, 61, 0], [63, 62, 0], [63, 62, 0], [63, 62, 0],
    [63, 62, 0], [63, 63, 0], [63, 63, 1], [63, 63, 2], [63, 63, 3], [63, 63, 4],
    [63, 63, 5], [63, 63, 6], [63, 63, 7], [63, 63, 8], [63, 63, 9], [63, 63, 10],
    [63, 63, 10], [63, 63, 11], [63, 63, 12], [63, 63, 13], [63, 63, 14], [63, 63, 15],
    [63, 63, 16], [63, 63, 17], [63, 63, 18], [63, 63, 19], [63, 63, 20], [63, 63, 21],
    [63, 63, 21], [63, 63, 22], [63, 63, 23], [63, 63, 24], [63, 63, 25], [63, 63, 26],
    [63, 63, 27], [63, 63, 28], [63, 63, 29], [63, 63, 30], [63, 63, 31], [63, 63, 31],
    [63, 63, 32], [63, 63, 33], [63, 63, 34], [63, 63, 35], [63, 63, 36], [63, 63, 37],
    [63, 63, 38], [63, 63, 39], [63, 63, 40], [63, 63, 41], [63, 63, 42], [63, 63, 42],
    [63, 63, 43], [63, 63, 44], [63, 63, 45], [63, 63, 46], [63, 63, 47], [63, 63, 48],
    [63, 63, 49], [63, 63, 50], [63, 63, 51], [63, 63, 52], [63, 63, 52], [63, 63, 53],
    [63, 63, 54], [63, 63, 55], [63, 63, 56], [63, 63, 57], [63, 63, 58], [63, 63, 59],
    [63, 63, 60], [63, 63, 61], [63, 63, 62], [63, 63, 63],
];

/// One dithered grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DitherCell {
    pub ch: u32,
    pub attr: u32,
}

/// Precomputed heat → cell table.
#[derive(Debug, Clone)]
pub struct CellDither {
    table: Vec<DitherCell>,
}

impl CellDither {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: (0..=255u8).map(|h| nearest(heat_color(h))).collect(),
        }
    }

    /// Undithered cell for `heat`.
    #[must_use]
    pub fn lookup(&self, heat: u8) -> DitherCell {
        self.table[usize::from(heat)]
    }

    /// Cell for `heat` at grid position `(x, y)`, with ordered dithering.
    /// Zero heat is never dithered so cold regions stay empty.
    #[must_use]
    pub fn cell(&self, heat: u8, x: u16, y: u16) -> DitherCell {
        if heat == 0 {
            return self.table[0];
        }
        let offset = i16::from(BAYER4[usize::from(y & 3)][usize::from(x & 3)]) - 8;
        let h = (i16::from(heat) + offset).clamp(0, 255);
        self.table[h as usize]
    }
}

impl Default for CellDither {
    fn default() -> Self {
        Self::new()
    }
}

/// 8-bit color of a heat level.
#[must_use]
pub fn heat_color(heat: u8) -> Rgb {
    let [r, g, b] = HEAT_PALETTE[usize::from(heat)];
    Rgb::new(widen6(r), widen6(g), widen6(b))
}

/// 6-bit channel to 8-bit, mapping 63 to 255.
const fn widen6(v: u8) -> u8 {
    (v << 2) | (v >> 4)
}

fn nearest(target: Rgb) -> DitherCell {
    let steps = (RAMP.len() - 1) as i32;
    let mut best = (i32::MAX, DitherCell { ch: 0x20, attr: 0 });
    for (bg, bg_rgb) in ANSI_PALETTE.iter().enumerate() {
        for (fg, fg_rgb) in ANSI_PALETTE.iter().enumerate() {
            for (k, ch) in RAMP.iter().enumerate() {
                // Compare in units of `steps` to stay in integers.
                let k = k as i32;
                let mix = |b: u8, f: u8| i32::from(b) * (steps - k) + i32::from(f) * k;
                let dr = mix(bg_rgb.r, fg_rgb.r) - i32::from(target.r) * steps;
                let dg = mix(bg_rgb.g, fg_rgb.g) - i32::from(target.g) * steps;
                let db = mix(bg_rgb.b, fg_rgb.b) - i32::from(target.b) * steps;
                let dist = dr * dr + dg * dg + db * db;
                if dist < best.0 {
                    best = (
                        dist,
                        DitherCell {
                            ch: u32::from(*ch),
                            attr: Attr::from_ansi(fg as u8, bg as u8).bits(),
                        },
                    );
                }
            }
        }
    }
    best.1
}

#[cfg(test)]
mod tests {
    use super::*;

    use flamegrid_core::attr::decode;
    use pretty_assertions::assert_eq;

    #[test]
    fn palette_ends() {
        assert_eq!(heat_color(0), Rgb::BLACK);
        assert_eq!(heat_color(255), Rgb::new(255, 255, 255));
    }

    #[test]
    fn cold_is_a_blank_on_black() {
        let d = CellDither::new();
        let cell = d.lookup(0);
        assert_eq!(cell.ch, 0x20);
        assert_eq!(decode(cell.attr), (0, 0));
        for (x, y) in [(0, 0), (1, 3), (2, 2)] {
            assert_eq!(d.cell(0, x, y), cell);
        }
    }

    #[test]
    fn hottest_is_a_full_white_glyph() {
        let cell = CellDither::new().lookup(255);
        assert_eq!(cell.ch, '@' as u32);
        assert_eq!(decode(cell.attr), (15, 0));
    }

    #[test]
    fn every_cell_uses_palette_indices() {
        let d = CellDither::new();
        for h in 0..=255u8 {
            let (fg, bg) = decode(d.lookup(h).attr);
            assert!(fg < 16 && bg < 16, "heat {h}: ({fg}, {bg})");
            assert!(RAMP.iter().any(|c| u32::from(*c) == d.lookup(h).ch));
        }
    }

    #[test]
    fn ordered_offset_stays_in_range() {
        let d = CellDither::new();
        for x in 0..4 {
            for y in 0..4 {
                // (x, y) = (0, 0) has the largest negative offset.
                let low = d.cell(1, x, y);
                let high = d.cell(255, x, y);
                assert!(d.table.contains(&low));
                assert!(d.table.contains(&high));
            }
        }
    }
}

//! The fixed 16-color ANSI palette.
//!
//! The reference palette is specified as 4-bit-per-channel `0xfRGB` words
//! ([`ANSITAB16`]). Each nibble expands to 8 bits as `v * 0x11`. The expanded
//! table ([`ANSI_PALETTE`]) is checked in rather than computed, and the tests
//! pin it to the nibble table so the two cannot drift apart.

use std::fmt;

/// An opaque 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack as `0xRRGGBBAA` with full alpha.
    #[inline]
    #[must_use]
    pub const fn to_rgba_u32(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | 0xff
    }

    /// Lowercase `#rrggbb`, the form Canvas2D accepts as a fill style.
    #[must_use]
    pub fn to_css_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Reference palette as `0xfRGB` nibble words.
pub const ANSITAB16: [u16; 16] = [
    0xf000, 0xf00a, 0xf0a0, 0xf0aa, 0xfa00, 0xfa0a, 0xfa50, 0xfaaa, //
    0xf555, 0xf55f, 0xf5f5, 0xf5ff, 0xff55, 0xff5f, 0xfff5, 0xffff,
];

/// Expand a 4-bit channel value to 8 bits.
#[inline]
#[must_use]
pub const fn expand_nibble(v: u8) -> u8 {
    (v & 0x0f) * 0x11
}

/// Expand one `0xfRGB` reference word to [`Rgb`].
#[must_use]
pub const fn expand_ansitab(word: u16) -> Rgb {
    Rgb::new(
        expand_nibble((word >> 8) as u8),
        expand_nibble((word >> 4) as u8),
        expand_nibble(word as u8),
    )
}

/// The ANSI palette, indexed by color index.
pub const ANSI_PALETTE: [Rgb; 16] = [
    Rgb::new(0x00, 0x00, 0x00), // 0  black
    Rgb::new(0x00, 0x00, 0xaa), // 1  blue
    Rgb::new(0x00, 0xaa, 0x00), // 2  green
    Rgb::new(0x00, 0xaa, 0xaa), // 3  cyan
    Rgb::new(0xaa, 0x00, 0x00), // 4  red
    Rgb::new(0xaa, 0x00, 0xaa), // 5  magenta
    Rgb::new(0xaa, 0x55, 0x00), // 6  brown
    Rgb::new(0xaa, 0xaa, 0xaa), // 7  light gray
    Rgb::new(0x55, 0x55, 0x55), // 8  dark gray
    Rgb::new(0x55, 0x55, 0xff), // 9  light blue
    Rgb::new(0x55, 0xff, 0x55), // 10 light green
    Rgb::new(0x55, 0xff, 0xff), // 11 light cyan
    Rgb::new(0xff, 0x55, 0x55), // 12 light red
    Rgb::new(0xff, 0x55, 0xff), // 13 light magenta
    Rgb::new(0xff, 0xff, 0x55), // 14 yellow
    Rgb::new(0xff, 0xff, 0xff), // 15 white
];

/// Foreground index used when a cell's foreground is not a palette index.
pub const DEFAULT_FG_INDEX: u8 = 7;

/// Palette lookup. Returns `None` for `index >= 16`.
#[inline]
#[must_use]
pub fn color_of(index: u8) -> Option<Rgb> {
    ANSI_PALETTE.get(usize::from(index)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_matches_nibble_expansion_for_every_index() {
        for (i, word) in ANSITAB16.iter().enumerate() {
            assert_eq!(ANSI_PALETTE[i], expand_ansitab(*word), "palette drift at index {i}");
        }
    }

    #[test]
    fn css_hex_is_lowercase_and_padded() {
        assert_eq!(ANSI_PALETTE[6].to_css_hex(), "#aa5500");
        assert_eq!(ANSI_PALETTE[0].to_css_hex(), "#000000");
        assert_eq!(ANSI_PALETTE[9].to_css_hex(), "#5555ff");
    }

    #[test]
    fn rgba_packing() {
        assert_eq!(ANSI_PALETTE[12].to_rgba_u32(), 0xff5555ff);
        assert_eq!(Rgb::BLACK.to_rgba_u32(), 0x000000ff);
    }

    #[test]
    fn color_of_rejects_out_of_table() {
        assert_eq!(color_of(15), Some(Rgb::new(0xff, 0xff, 0xff)));
        assert_eq!(color_of(16), None);
        assert_eq!(color_of(DEFAULT_FG_INDEX), Some(Rgb::new(0xaa, 0xaa, 0xaa)));
    }

    #[test]
    fn expand_nibble_covers_range() {
        assert_eq!(expand_nibble(0), 0x00);
        assert_eq!(expand_nibble(0x5), 0x55);
        assert_eq!(expand_nibble(0xa), 0xaa);
        assert_eq!(expand_nibble(0xf), 0xff);
    }
}

//! Packed cell attribute words.
//!
//! An attribute word packs a foreground and a background color field into one
//! `u32`:
//!
//! ```text
//!  31            18 17             4 3    0
//! ┌────────────────┬────────────────┬──────┐
//! │ bg ^ 0x40      │ fg ^ 0x40      │ style│
//! └────────────────┴────────────────┴──────┘
//! ```
//!
//! Each color field is 14 bits wide and stored XOR `0x40`. Decoded values
//! below 16 are ANSI palette indices; anything else is an "extended" value
//! whose handling is left to the consumer. The codec itself never fails.

/// Bit offset of the foreground field.
pub const FG_SHIFT: u32 = 4;
/// Bit offset of the background field.
pub const BG_SHIFT: u32 = 18;
/// Width mask of one color field.
pub const FIELD_MASK: u32 = 0x3fff;
/// Value every stored field is XORed with.
pub const FIELD_XOR: u32 = 0x40;
/// Low bits reserved for style flags (bold, italics, ...).
pub const STYLE_MASK: u32 = 0xf;

/// Number of directly addressable palette indices.
pub const ANSI_COLORS: u16 = 16;
/// Extended value meaning "terminal default color".
pub const ANSI_DEFAULT: u16 = 0x10;
/// Extended value meaning "transparent".
pub const ANSI_TRANSPARENT: u16 = 0x20;

#[inline]
const fn decode_field(word: u32, shift: u32) -> u16 {
    (((word >> shift) & FIELD_MASK) ^ FIELD_XOR) as u16
}

#[inline]
const fn encode_field(value: u16, shift: u32) -> u32 {
    ((value as u32 ^ FIELD_XOR) & FIELD_MASK) << shift
}

/// Decode a raw attribute word into `(fg, bg)`.
///
/// Total over the whole `u32` domain.
#[inline]
#[must_use]
pub const fn decode(word: u32) -> (u16, u16) {
    (decode_field(word, FG_SHIFT), decode_field(word, BG_SHIFT))
}

/// Encode `(fg, bg)` into a raw attribute word with no style bits.
///
/// Field values are truncated to 14 bits.
#[inline]
#[must_use]
pub const fn encode(fg: u16, bg: u16) -> u32 {
    encode_field(fg, FG_SHIFT) | encode_field(bg, BG_SHIFT)
}

/// One packed attribute word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Attr(pub u32);

impl Attr {
    /// Build an attribute from two color field values.
    #[inline]
    #[must_use]
    pub const fn new(fg: u16, bg: u16) -> Self {
        Self(encode(fg, bg))
    }

    /// Build an attribute from two ANSI palette indices.
    ///
    /// Indices are masked to 4 bits, so the result always decodes to palette
    /// colors.
    #[inline]
    #[must_use]
    pub const fn from_ansi(fg: u8, bg: u8) -> Self {
        Self::new((fg & 0x0f) as u16, (bg & 0x0f) as u16)
    }

    /// Decoded foreground field.
    #[inline]
    #[must_use]
    pub const fn fg(self) -> u16 {
        decode_field(self.0, FG_SHIFT)
    }

    /// Decoded background field.
    #[inline]
    #[must_use]
    pub const fn bg(self) -> u16 {
        decode_field(self.0, BG_SHIFT)
    }

    /// Style flag bits. The renderer ignores them.
    #[inline]
    #[must_use]
    pub const fn flags(self) -> u8 {
        (self.0 & STYLE_MASK) as u8
    }

    /// Raw word.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl From<u32> for Attr {
    fn from(word: u32) -> Self {
        Self(word)
    }
}

impl From<Attr> for u32 {
    fn from(attr: Attr) -> Self {
        attr.0
    }
}

/// Classification of a decoded color field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorField {
    /// Palette index in `0..16`.
    Ansi(u8),
    /// Any value outside the palette (default, transparent, truecolor, ...).
    Extended(u16),
}

impl ColorField {
    #[inline]
    #[must_use]
    pub const fn classify(value: u16) -> Self {
        if value < ANSI_COLORS {
            Self::Ansi(value as u8)
        } else {
            Self::Extended(value)
        }
    }

    /// Palette index, if any.
    #[inline]
    #[must_use]
    pub const fn ansi(self) -> Option<u8> {
        match self {
            Self::Ansi(idx) => Some(idx),
            Self::Extended(_) => None,
        }
    }
}

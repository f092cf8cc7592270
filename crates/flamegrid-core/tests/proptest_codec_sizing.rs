//! Property tests for the attribute codec and the sizing policy.
//!
//! Verifies:
//! 1. Any pair of 14-bit field values survives encode → decode.
//! 2. Decoding ignores the style nibble.
//! 3. Words with no style bits survive decode → encode.
//! 4. Layouts never drop below the minimum grid and always fit the viewport
//!    unless a minimum forced them larger.

use flamegrid_core::attr::{self, Attr};
use flamegrid_core::{SizingPolicy, Viewport};
use proptest::prelude::*;

proptest! {
    #[test]
    fn encode_decode_roundtrip(fg in 0u16..0x4000, bg in 0u16..0x4000) {
        prop_assert_eq!(attr::decode(attr::encode(fg, bg)), (fg, bg));
    }

    #[test]
    fn style_bits_are_ignored(word in any::<u32>(), style in 0u32..16) {
        let with_style = (word & !attr::STYLE_MASK) | style;
        prop_assert_eq!(attr::decode(with_style), attr::decode(word));
    }

    #[test]
    fn styleless_words_roundtrip(word in any::<u32>()) {
        let word = word & !attr::STYLE_MASK;
        let (fg, bg) = attr::decode(word);
        prop_assert_eq!(attr::encode(fg, bg), word);
        prop_assert_eq!(Attr(word), Attr::new(fg, bg));
    }

    #[test]
    fn layout_respects_minimums(
        w in 0.0f64..8000.0,
        h in 0.0f64..5000.0,
        dpr in 0.1f64..4.0,
    ) {
        let policy = SizingPolicy::default();
        let l = policy.layout(Viewport::new(w, h, dpr));
        prop_assert!(l.cols >= policy.min_cols);
        prop_assert!(l.rows >= policy.min_rows);
        prop_assert!(l.cell.height >= policy.min_cell_height);
        prop_assert!(l.cell.width >= 1);

        let (px_w, px_h) = l.surface_size_px();
        if l.cols > policy.min_cols {
            prop_assert!(f64::from(px_w) <= w * dpr + 1e-6);
        }
        if l.rows > policy.min_rows {
            prop_assert!(f64::from(px_h) <= h * dpr + 1e-6);
        }
    }
}

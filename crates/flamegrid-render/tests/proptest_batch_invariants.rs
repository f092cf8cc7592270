//! Property-based invariants for the batching renderer.
//!
//! Verifies, over arbitrary grids and attribute words:
//! 1. No rectangle is filled for a cell whose background is 0 or ≥ 16.
//! 2. No glyph is painted for a codepoint ≤ 0x20.
//! 3. Every fill/glyph is issued under a palette color, and glyphs for
//!    extended foregrounds use the default (light gray).
//! 4. All background rectangles precede the first glyph.
//! 5. Consecutive `set_fill` calls within a pass never repeat a color.

use flamegrid_core::palette::{ANSI_PALETTE, DEFAULT_FG_INDEX};
use flamegrid_core::{Attr, CellMetrics, GridSnapshot};
use flamegrid_render::{BatchRenderer, DrawOp, PixelRect, RecordingSurface};
use proptest::prelude::*;

const CELL: CellMetrics = CellMetrics {
    width: 7,
    height: 12,
};

fn arb_attr() -> impl Strategy<Value = u32> {
    prop_oneof![
        // Conforming palette pairs.
        (0u8..16, 0u8..16).prop_map(|(fg, bg)| Attr::from_ansi(fg, bg).bits()),
        // Arbitrary words, including extended fields and style bits.
        any::<u32>(),
    ]
}

fn arb_codepoint() -> impl Strategy<Value = u32> {
    prop_oneof![0u32..=0x20, 0x21u32..0x7f, 0x80u32..0x3000]
}

fn arb_grid() -> impl Strategy<Value = (u16, u16, Vec<u32>, Vec<u32>)> {
    (1u16..12, 1u16..8).prop_flat_map(|(w, h)| {
        let n = usize::from(w) * usize::from(h);
        (
            Just(w),
            Just(h),
            prop::collection::vec(arb_codepoint(), n),
            prop::collection::vec(arb_attr(), n),
        )
    })
}

fn render(w: u16, h: u16, chars: &[u32], attrs: &[u32]) -> RecordingSurface {
    let snap = GridSnapshot::new(w, h, chars, attrs).unwrap();
    let mut surface =
        RecordingSurface::new(u32::from(w) * CELL.width, u32::from(h) * CELL.height);
    BatchRenderer::new(CELL).render(&snap, &mut surface);
    surface
}

fn cell_at(px: u32, py: u32, w: u16) -> usize {
    (py / CELL.height) as usize * usize::from(w) + (px / CELL.width) as usize
}

proptest! {
    #[test]
    fn transparent_backgrounds_never_fill((w, h, chars, attrs) in arb_grid()) {
        let surface = render(w, h, &chars, &attrs);
        for op in surface.ops().iter().skip(2) {
            if let DrawOp::FillRect(PixelRect { x, y, .. }) = *op {
                let bg = Attr(attrs[cell_at(x, y, w)]).bg();
                prop_assert!(bg != 0 && bg < 16, "filled cell with bg {}", bg);
            }
        }
    }

    #[test]
    fn blank_codepoints_never_paint((w, h, chars, attrs) in arb_grid()) {
        let surface = render(w, h, &chars, &attrs);
        let expected = chars.iter().filter(|&&c| c > 0x20).count();
        let mut painted = 0;
        for op in surface.ops() {
            if let DrawOp::FillGlyph { codepoint, .. } = *op {
                prop_assert!(codepoint > 0x20);
                painted += 1;
            }
        }
        prop_assert_eq!(painted, expected);
    }

    #[test]
    fn glyph_colors_come_from_the_palette((w, h, chars, attrs) in arb_grid()) {
        let surface = render(w, h, &chars, &attrs);
        for (color, op) in surface.resolved() {
            let color = color.expect("every op follows a set_fill");
            prop_assert!(ANSI_PALETTE.contains(&color));
            if let DrawOp::FillGlyph { x, y, .. } = op {
                let fg = Attr(attrs[cell_at(x, y, w)]).fg();
                let expected = if fg < 16 { fg as usize } else { usize::from(DEFAULT_FG_INDEX) };
                prop_assert_eq!(color, ANSI_PALETTE[expected]);
            }
        }
    }

    #[test]
    fn backgrounds_commit_before_glyphs((w, h, chars, attrs) in arb_grid()) {
        let surface = render(w, h, &chars, &attrs);
        let ops = surface.ops();
        let first_glyph = ops.iter().position(|op| matches!(op, DrawOp::FillGlyph { .. }));
        let last_rect = ops.iter().rposition(|op| matches!(op, DrawOp::FillRect(_)));
        if let (Some(g), Some(r)) = (first_glyph, last_rect) {
            prop_assert!(r < g);
        }
    }

    #[test]
    fn no_redundant_switches_within_a_pass((w, h, chars, attrs) in arb_grid()) {
        let surface = render(w, h, &chars, &attrs);
        let ops = surface.ops();
        let split = ops
            .iter()
            .position(|op| matches!(op, DrawOp::FillGlyph { .. }))
            .map_or(ops.len(), |g| {
                // The switch that precedes the first glyph belongs to the
                // foreground pass.
                ops[..g].iter().rposition(|op| matches!(op, DrawOp::SetFill(_))).unwrap_or(g)
            });
        for pass in [&ops[2..split.max(2)], &ops[split.max(2)..]] {
            let switches: Vec<_> = pass
                .iter()
                .filter_map(|op| match op {
                    DrawOp::SetFill(c) => Some(*c),
                    _ => None,
                })
                .collect();
            for pair in switches.windows(2) {
                prop_assert_ne!(pair[0], pair[1]);
            }
        }
    }
}

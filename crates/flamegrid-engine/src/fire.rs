//! aafire heat automaton.
//!
//! The heat bitmap is `2*cols` wide and `2*rows - 4` tall, plus spare rows
//! below it. Every step:
//!
//! 1. A row of random hot spots is written just below the visible area
//!    (`feed`). Spot heat is capped by how long the fire has been burning,
//!    so it grows in from nothing after every init or resize.
//! 2. Each pixel becomes the cooled sum of five neighbours from the two
//!    rows below it (`cool`), through a lookup table whose cooling strength
//!    depends on the bitmap height.
//! 3. The top `2*rows - 6` bitmap rows are averaged per cell and dithered
//!    into characters and attribute words.
//!
//! # Determinism
//!
//! All randomness comes from one [`Xorshift32`] stream. `init_seeded` fixes
//! it; `resize` deliberately keeps it so a resized fire does not replay.
//!
//! # Memory
//!
//! The bitmap carries two rows of slack beyond the spare rows: the spot
//! writer can land one row below them and the cooling pass reads two
//! pixels past them. Both stay inside the allocation and read zeros.

use flamegrid_core::attr::{ANSI_DEFAULT, ANSI_TRANSPARENT, STYLE_MASK, encode};
use flamegrid_core::{AttrProbe, GridEngine};

use crate::dither::CellDither;
use crate::prng::{DEFAULT_SEED, Xorshift32};

/// Size of the cooling table: five neighbours of at most 255 each.
const MAX_TABLE: usize = 256 * 5;

/// Cooling numerator; divided by the bitmap height.
const COOLING: usize = 800;

/// Largest ANSI value `set_color_ansi` accepts (transparent).
const MAX_ANSI_VALUE: u8 = 0x20;

/// Attribute of a freshly cleared grid: default on transparent.
const fn blank_attr() -> u32 {
    encode(ANSI_DEFAULT, ANSI_TRANSPARENT)
}

/// Deterministic fire engine.
#[derive(Debug, Clone)]
pub struct FireEngine {
    cols: u16,
    rows: u16,
    /// Bitmap width (`2 * cols`).
    xsiz: usize,
    /// Simulated bitmap height (`2 * rows - 4`, at least 1).
    ysiz: usize,
    bitmap: Vec<u8>,
    table: Vec<u8>,
    rng: Xorshift32,
    /// Steps since the last init or resize; caps hot-spot heat.
    burn: u32,
    /// Counts down to the next extra draw from the stream.
    flicker: i32,
    dither: CellDither,
    chars: Vec<u32>,
    attrs: Vec<u32>,
    current_attr: u32,
}

impl FireEngine {
    /// An engine with an empty grid. Call `init` or `init_seeded` before
    /// stepping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cols: 0,
            rows: 0,
            xsiz: 0,
            ysiz: 0,
            bitmap: Vec::new(),
            table: vec![0; MAX_TABLE],
            rng: Xorshift32::default(),
            burn: 0,
            flicker: 0,
            dither: CellDither::new(),
            chars: Vec::new(),
            attrs: Vec::new(),
            current_attr: blank_attr(),
        }
    }

    /// A `cols × rows` engine seeded with `seed`.
    #[must_use]
    pub fn seeded(cols: u16, rows: u16, seed: u32) -> Self {
        let mut engine = Self::new();
        engine.init_seeded(cols, rows, seed);
        engine
    }

    /// Current PRNG state.
    #[must_use]
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    /// Raw heat bitmap, `2*cols` wide.
    #[must_use]
    pub fn heat(&self) -> &[u8] {
        &self.bitmap
    }

    fn allocate(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.burn = 0;
        self.flicker = 0;
        self.current_attr = blank_attr();

        let cells = usize::from(cols) * usize::from(rows);
        self.chars.clear();
        self.chars.resize(cells, 0x20);
        self.attrs.clear();
        self.attrs.resize(cells, blank_attr());

        if cells == 0 {
            self.xsiz = 0;
            self.ysiz = 0;
            self.bitmap.clear();
            return;
        }

        self.xsiz = usize::from(cols) * 2;
        self.ysiz = (usize::from(rows) * 2).saturating_sub(4).max(1);
        self.bitmap.clear();
        self.bitmap.resize(self.xsiz * (self.ysiz + 4), 0);
        self.build_table();

        #[cfg(feature = "tracing")]
        tracing::debug!(cols, rows, xsiz = self.xsiz, ysiz = self.ysiz, "fire allocated");
    }

    fn build_table(&mut self) {
        let minus = (COOLING / self.ysiz).max(1);
        for (i, slot) in self.table.iter_mut().enumerate() {
            // Largest value is (1279 - 1) / 5 = 255.
            *slot = if i > minus { ((i - minus) / 5) as u8 } else { 0 };
        }
    }

    /// Random walk step in `-2..=3`.
    fn jitter(&mut self) -> i32 {
        self.rng.below(6) as i32 - 2
    }

    fn feed(&mut self) {
        self.burn = self.burn.wrapping_add(1);
        self.flicker -= 1;
        if self.flicker < 0 {
            self.flicker = self.rng.below(3) as i32;
        }

        let x = self.xsiz;
        let end = x * (self.ysiz + 1);
        let mut p = x * self.ysiz;
        // Ramps that keep the edges cooler than the middle.
        let mut left: u32 = 1;
        let mut right: u32 = 4 * x as u32 + 1;

        while p < end {
            let cap = left.min(right).min(self.burn).max(1);
            let mut spot = self.rng.below(cap);
            let mut run = self.rng.below(6);
            while p < end && run != 0 {
                self.bitmap[p] = spot as u8;
                spot = spot.wrapping_add_signed(self.jitter());
                self.bitmap[p + x] = spot as u8;
                spot = spot.wrapping_add_signed(self.jitter());
                p += 1;
                run -= 1;
                left += 4;
                right = right.wrapping_sub(4);
            }
            self.bitmap[p + 2 * x] = spot as u8;
            // Keeps the stream aligned with the reference walk.
            self.jitter();
            p += 1;
            left += 4;
            right = right.wrapping_sub(4);
        }
    }

    fn cool(&mut self) {
        let x = self.xsiz;
        let b = &mut self.bitmap;
        for i in 0..=x * self.ysiz {
            let sum = usize::from(b[i + x - 1])
                + usize::from(b[i + x + 1])
                + usize::from(b[i + x])
                + usize::from(b[i + 2 * x - 1])
                + usize::from(b[i + 2 * x + 1]);
            b[i] = self.table[sum];
        }
    }

    /// Visible bitmap rows.
    fn visible_rows(&self) -> usize {
        self.ysiz.saturating_sub(2).max(1)
    }

    fn paint(&mut self) {
        let cols = usize::from(self.cols);
        let rows = usize::from(self.rows);
        let visible = self.visible_rows();
        let x = self.xsiz;

        for cy in 0..rows {
            let y0 = cy * visible / rows;
            let y1 = ((cy + 1) * visible / rows).max(y0 + 1);
            for cx in 0..cols {
                let x0 = cx * 2;
                let mut sum = 0usize;
                for by in y0..y1 {
                    let row = by * x;
                    sum += usize::from(self.bitmap[row + x0]) + usize::from(self.bitmap[row + x0 + 1]);
                }
                let heat = (sum / (2 * (y1 - y0))) as u8;
                let cell = self.dither.cell(heat, cx as u16, cy as u16);
                let i = cy * cols + cx;
                self.chars[i] = cell.ch;
                self.attrs[i] = cell.attr;
                self.current_attr = cell.attr;
            }
        }
    }
}

impl Default for FireEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GridEngine for FireEngine {
    fn init(&mut self, cols: u16, rows: u16) {
        self.init_seeded(cols, rows, DEFAULT_SEED);
    }

    fn init_seeded(&mut self, cols: u16, rows: u16, seed: u32) {
        self.rng = Xorshift32::new(seed);
        self.allocate(cols, rows);
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.allocate(cols, rows);
    }

    fn step(&mut self) {
        if self.chars.is_empty() {
            return;
        }
        self.feed();
        self.cool();
        self.paint();
    }

    fn width(&self) -> u16 {
        self.cols
    }

    fn height(&self) -> u16 {
        self.rows
    }

    fn chars(&self) -> &[u32] {
        &self.chars
    }

    fn attrs(&self) -> &[u32] {
        &self.attrs
    }
}

impl AttrProbe for FireEngine {
    /// Values above `0x20` are rejected and leave the attribute unchanged.
    fn set_color_ansi(&mut self, fg: u8, bg: u8) {
        if fg > MAX_ANSI_VALUE || bg > MAX_ANSI_VALUE {
            return;
        }
        self.current_attr =
            (self.current_attr & STYLE_MASK) | encode(u16::from(fg), u16::from(bg));
    }

    fn current_attr(&self) -> u32 {
        self.current_attr
    }
}

//! Portable xorshift32 generator.
//!
//! The whole engine draws from one stream, so a fixed seed fixes every
//! frame on every platform.

/// Seed used by [`GridEngine::init`](flamegrid_core::GridEngine::init).
pub const DEFAULT_SEED: u32 = 42;

/// Deterministic xorshift32 PRNG with 31-bit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    /// Seed the generator. Zero is a fixed point of xorshift and is
    /// replaced by 1.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Next value in `0..=0x7fff_ffff`.
    #[inline]
    pub fn next_u31(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x & 0x7fff_ffff
    }

    /// `next_u31() % n`. `n` must be non-zero.
    #[inline]
    pub fn below(&mut self, n: u32) -> u32 {
        self.next_u31() % n
    }

    /// Raw internal state, for carrying the stream across a reset.
    #[must_use]
    pub const fn state(&self) -> u32 {
        self.state
    }
}

impl Default for Xorshift32 {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

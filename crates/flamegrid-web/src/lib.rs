#![forbid(unsafe_code)]

//! WASM front end for flamegrid.
//!
//! Exposes [`FlamegridWeb`] to JavaScript: it owns a [`FrameScheduler`]
//! driving the reference fire engine onto a `<canvas>` through the Canvas2D
//! API. The host page keeps the `requestAnimationFrame` loop and the DOM
//! listeners and forwards them:
//!
//! ```js
//! const fire = new FlamegridWeb(canvas);
//! fire.start(innerWidth, innerHeight, devicePixelRatio);
//! const loop = (t) => { fire.tick(t); requestAnimationFrame(loop); };
//! requestAnimationFrame(loop);
//! addEventListener('resize', () =>
//!     fire.resize(innerWidth, innerHeight, devicePixelRatio, performance.now()));
//! addEventListener('keydown', (e) => { if (e.code === 'Space') fire.togglePause(); });
//! ```
//!
//! [`FrameScheduler`]: flamegrid_runtime::FrameScheduler

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{Canvas2dSurface, FlamegridWeb};

/// Canvas text baseline; glyphs are anchored at the cell's top-left corner.
pub const TEXT_BASELINE: &str = "top";

/// CSS font shorthand for a monospace font of `font_px` device pixels.
#[must_use]
pub fn font_spec(font_px: u32) -> String {
    format!("{font_px}px monospace")
}

/// Text to paint for `codepoint`, or `None` if it is not a scalar value.
#[must_use]
pub fn glyph_text(codepoint: u32, buf: &mut [u8; 4]) -> Option<&str> {
    char::from_u32(codepoint).map(|c| &*c.encode_utf8(buf))
}

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FlamegridWeb;

#[cfg(not(target_arch = "wasm32"))]
impl FlamegridWeb {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_spec_is_css_shorthand() {
        assert_eq!(font_spec(14), "14px monospace");
    }

    #[test]
    fn glyph_text_encodes_scalars_only() {
        let mut buf = [0; 4];
        assert_eq!(glyph_text('@' as u32, &mut buf), Some("@"));
        assert_eq!(glyph_text(0x2588, &mut buf), Some("\u{2588}"));
        assert_eq!(glyph_text(0xd800, &mut buf), None);
        assert_eq!(glyph_text(0x11_0000, &mut buf), None);
    }
}

#![forbid(unsafe_code)]

//! Snapshot → pixel surface rendering for flamegrid.
//!
//! The renderer is pure with respect to its inputs: given the same snapshot
//! and cell metrics it issues the same sequence of surface calls. It knows
//! nothing about time, pausing, or how the engine produced the grid.
//!
//! Switching the active fill color is the expensive operation on real
//! surfaces, so [`BatchRenderer`] paints in two row-major passes (backgrounds,
//! then glyphs) and only switches color when the index actually changes.

pub mod batch;
pub mod framebuffer;
pub mod surface;

pub use batch::{BatchRenderer, RenderStats};
pub use framebuffer::Framebuffer;
pub use surface::{DrawOp, PixelRect, RecordingSurface, Surface};

#![forbid(unsafe_code)]

//! Core data model for flamegrid.
//!
//! This crate holds everything the renderer and the parity harness agree on:
//! - the packed attribute word and its codec ([`attr`]),
//! - the fixed 16-entry ANSI palette ([`palette`]),
//! - the borrowed, read-only grid view exposed by an engine ([`snapshot`]),
//! - the engine boundary traits ([`engine`]),
//! - the viewport → grid sizing policy ([`viewport`]).
//!
//! Nothing here allocates per frame and nothing here owns engine memory.

pub mod attr;
pub mod engine;
pub mod palette;
pub mod snapshot;
pub mod viewport;

pub use attr::{Attr, ColorField};
pub use engine::{AttrProbe, GridEngine};
pub use palette::{ANSI_PALETTE, Rgb, color_of};
pub use snapshot::{GridDump, GridSnapshot, SnapshotError};
pub use viewport::{CellMetrics, GridLayout, SizingPolicy, Viewport};

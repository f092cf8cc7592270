//! Borrowed, read-only views of an engine's grid.
//!
//! A [`GridSnapshot`] never owns engine memory. Its lifetime is tied to a
//! shared borrow of the engine, so the engine cannot step or resize while a
//! snapshot is alive.

use std::fmt;

use crate::attr::Attr;

/// Failure to build a snapshot from engine buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Width or height is zero.
    EmptyGrid { width: u16, height: u16 },
    /// A buffer's length does not equal `width * height`.
    LengthMismatch {
        which: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { width, height } => {
                write!(f, "grid has no cells ({width}x{height})")
            }
            Self::LengthMismatch {
                which,
                expected,
                actual,
            } => write!(
                f,
                "{which} buffer holds {actual} cells, grid needs {expected}"
            ),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// A row-major `width × height` view of codepoints and attribute words.
#[derive(Debug, Clone, Copy)]
pub struct GridSnapshot<'a> {
    width: u16,
    height: u16,
    chars: &'a [u32],
    attrs: &'a [u32],
}

impl<'a> GridSnapshot<'a> {
    /// Wrap engine buffers, checking both hold exactly `width * height` cells.
    pub fn new(
        width: u16,
        height: u16,
        chars: &'a [u32],
        attrs: &'a [u32],
    ) -> Result<Self, SnapshotError> {
        if width == 0 || height == 0 {
            return Err(SnapshotError::EmptyGrid { width, height });
        }
        let expected = usize::from(width) * usize::from(height);
        if chars.len() != expected {
            return Err(SnapshotError::LengthMismatch {
                which: "chars",
                expected,
                actual: chars.len(),
            });
        }
        if attrs.len() != expected {
            return Err(SnapshotError::LengthMismatch {
                which: "attrs",
                expected,
                actual: attrs.len(),
            });
        }
        Ok(Self {
            width,
            height,
            chars,
            attrs,
        })
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Number of cells (`width * height`).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false: empty grids are rejected at construction.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn chars(&self) -> &'a [u32] {
        self.chars
    }

    #[inline]
    #[must_use]
    pub const fn attrs(&self) -> &'a [u32] {
        self.attrs
    }

    /// Codepoint and attribute of the cell at `(x, y)`, or `None` when out
    /// of bounds.
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<(u32, Attr)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = usize::from(y) * usize::from(self.width) + usize::from(x);
        Some((self.chars[idx], Attr(self.attrs[idx])))
    }

    /// Codepoints and attributes of row `y`.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<(&'a [u32], &'a [u32])> {
        if y >= self.height {
            return None;
        }
        let w = usize::from(self.width);
        let start = usize::from(y) * w;
        Some((
            &self.chars[start..start + w],
            &self.attrs[start..start + w],
        ))
    }

    /// Iterate cells in row-major order as `(x, y, codepoint, attr)`.
    pub fn cells(&self) -> impl Iterator<Item = (u16, u16, u32, Attr)> + 'a {
        let width = self.width;
        self.chars
            .iter()
            .zip(self.attrs.iter())
            .enumerate()
            .map(move |(idx, (&ch, &attr))| {
                let x = (idx % usize::from(width)) as u16;
                let y = (idx / usize::from(width)) as u16;
                (x, y, ch, Attr(attr))
            })
    }

    /// Copy the view into an owned [`GridDump`].
    #[must_use]
    pub fn to_dump(&self) -> GridDump {
        GridDump {
            width: self.width,
            height: self.height,
            chars: self.chars.to_vec(),
            attrs: self.attrs.to_vec(),
        }
    }
}

/// Owned copy of a snapshot, used where data must outlive the next step
/// (golden capture, determinism checks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDump {
    pub width: u16,
    pub height: u16,
    pub chars: Vec<u32>,
    pub attrs: Vec<u32>,
}

impl GridDump {
    /// Borrow the dump as a snapshot.
    pub fn snapshot(&self) -> Result<GridSnapshot<'_>, SnapshotError> {
        GridSnapshot::new(self.width, self.height, &self.chars, &self.attrs)
    }
}

//! Golden reference files.
//!
//! One pair of files per checkpoint, named
//! `frame_{step:03}_chars.bin` / `frame_{step:03}_attrs.bin`, each a raw
//! array of little-endian `u32` words with no header.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flamegrid_core::GridDump;
use serde::Serialize;

/// Which of a snapshot's two arrays a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayKind {
    Chars,
    Attrs,
}

impl ArrayKind {
    pub const ALL: [Self; 2] = [Self::Chars, Self::Attrs];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chars => "chars",
            Self::Attrs => "attrs",
        }
    }
}

impl fmt::Display for ArrayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File name for one checkpoint array.
#[must_use]
pub fn golden_file_name(step: u32, kind: ArrayKind) -> String {
    format!("frame_{step:03}_{kind}.bin")
}

#[derive(Debug)]
pub enum GoldenError {
    Io { path: PathBuf, source: io::Error },
    /// File size is not a whole number of 32-bit words.
    Misaligned { path: PathBuf, len: usize },
}

impl fmt::Display for GoldenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Misaligned { path, len } => write!(
                f,
                "{}: {len} bytes is not a multiple of 4",
                path.display()
            ),
        }
    }
}

impl std::error::Error for GoldenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Misaligned { .. } => None,
        }
    }
}

/// Serialize words as little-endian bytes.
#[must_use]
pub fn encode_words(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Parse little-endian words. `None` if the length is not a multiple of 4.
#[must_use]
pub fn decode_words(bytes: &[u8]) -> Option<Vec<u32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

/// A directory of golden files.
#[derive(Debug, Clone)]
pub struct GoldenStore {
    root: PathBuf,
}

impl GoldenStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path(&self, step: u32, kind: ArrayKind) -> PathBuf {
        self.root.join(golden_file_name(step, kind))
    }

    pub fn load(&self, step: u32, kind: ArrayKind) -> Result<Vec<u32>, GoldenError> {
        let path = self.path(step, kind);
        let bytes = fs::read(&path).map_err(|source| GoldenError::Io {
            path: path.clone(),
            source,
        })?;
        decode_words(&bytes).ok_or(GoldenError::Misaligned {
            len: bytes.len(),
            path,
        })
    }

    pub fn store(&self, step: u32, kind: ArrayKind, words: &[u32]) -> Result<PathBuf, GoldenError> {
        let path = self.path(step, kind);
        let io_err = |source| GoldenError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(io_err)?;
        fs::write(&path, encode_words(words)).map_err(io_err)?;
        Ok(path)
    }

    /// Write both arrays of `dump` for `step`.
    pub fn store_dump(&self, step: u32, dump: &GridDump) -> Result<[PathBuf; 2], GoldenError> {
        Ok([
            self.store(step, ArrayKind::Chars, &dump.chars)?,
            self.store(step, ArrayKind::Attrs, &dump.attrs)?,
        ])
    }
}

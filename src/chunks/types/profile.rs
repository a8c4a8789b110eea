//! Version profiles: every constant that differs between the two on-disk layouts.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use super::error::{ChunksError, Result};
use super::models::{BLOCKS_PER_CHUNK, DirectoryEntry};
use crate::chunks::format::{CHUNK_HEADER_SIZE, SURFACE_SECTION_SIZE};

/// How a single block cell is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLayout {
    /// Two bytes: type, then `data << 4 | light`. Versions up to 1.28.
    BytePair,
    /// One little-endian word: `type:10 | light:4 | data:18`. Versions from 1.29.
    PackedWord,
}

impl BlockLayout {
    /// Size of one block cell in bytes.
    pub const fn cell_size(self) -> usize {
        match self {
            BlockLayout::BytePair => 2,
            BlockLayout::PackedWord => 4,
        }
    }
}

/// The resolved set of format constants for one on-disk layout.
///
/// Selected once per run and passed by reference into every decode call, so
/// validation compares against data held here rather than branching on a
/// version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionProfile {
    /// Required contents of the directory's trailing guard slot.
    pub guard_sentinel: DirectoryEntry,
    /// Second magic word of every chunk header.
    pub header_magic2: u32,
    /// Directory offset value marking an unused slot.
    pub unused_offset: i32,
    pub block_layout: BlockLayout,
    /// Name the game gives the file, used for auto-detection.
    pub file_name: &'static str,
}

/// Oldest minor version of 1.x that writes the byte-pair layout.
const FIRST_LEGACY_MINOR: u32 = 4;
/// First minor version of 1.x that writes the packed-word layout.
const FIRST_PACKED_MINOR: u32 = 29;

impl VersionProfile {
    /// `Chunks.dat` written by Survivalcraft 1.4 to 1.28.
    pub const LEGACY: Self = Self {
        guard_sentinel: DirectoryEntry::filled(0),
        header_magic2: 0xFFFF_FFFF,
        unused_offset: 0,
        block_layout: BlockLayout::BytePair,
        file_name: "Chunks.dat",
    };

    /// `Chunks32.dat` written by Survivalcraft 1.29 and later 1.x releases.
    pub const PACKED: Self = Self {
        guard_sentinel: DirectoryEntry::filled(-1),
        header_magic2: 0xFFFF_FFFE,
        unused_offset: -1,
        block_layout: BlockLayout::PackedWord,
        file_name: "Chunks32.dat",
    };

    /// Resolves a Survivalcraft version string such as `"1.5"` or `"1.29"`.
    ///
    /// Accepts `MAJOR.MINOR` with an optional `.PATCH`. Anything outside
    /// 1.4 ..= 1.28 and 1.29 .. (major 1) is a configuration error.
    pub fn from_version(version: &str) -> Result<Self> {
        let unsupported = || ChunksError::UnsupportedVersion(version.to_string());
        let (major, minor) = parse_version(version).ok_or_else(unsupported)?;

        let profile = match (major, minor) {
            (1, m) if (FIRST_LEGACY_MINOR..FIRST_PACKED_MINOR).contains(&m) => Self::LEGACY,
            (1, m) if m >= FIRST_PACKED_MINOR => Self::PACKED,
            _ => return Err(unsupported()),
        };
        debug!("Version {} resolved to {}", version, profile);
        Ok(profile)
    }

    /// Detects the layout from the file's base name (`Chunks.dat` or `Chunks32.dat`).
    pub fn from_file_name(name: &str) -> Result<Self> {
        [Self::LEGACY, Self::PACKED]
            .into_iter()
            .find(|profile| profile.file_name == name)
            .ok_or_else(|| ChunksError::UndetectedVersion(name.to_string()))
    }

    /// Like [`from_file_name`](Self::from_file_name), using the last component of `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ChunksError::UndetectedVersion(path.display().to_string()))?;
        Self::from_file_name(name)
    }

    /// Whether a directory slot holds a chunk under this profile.
    #[inline]
    pub fn is_used(&self, entry: &DirectoryEntry) -> bool {
        entry.offset != self.unused_offset
    }

    /// Size of a chunk's block section in bytes.
    pub const fn blocks_size(&self) -> usize {
        BLOCKS_PER_CHUNK * self.block_layout.cell_size()
    }

    /// Size of a chunk's body (blocks and surface) in bytes.
    pub const fn body_size(&self) -> usize {
        self.blocks_size() + SURFACE_SECTION_SIZE
    }

    /// Total size of one chunk including its header.
    pub const fn chunk_size(&self) -> usize {
        CHUNK_HEADER_SIZE + self.body_size()
    }
}

impl FromStr for VersionProfile {
    type Err = ChunksError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_version(s)
    }
}

impl fmt::Display for VersionProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.block_layout {
            BlockLayout::BytePair => write!(f, "1.4-1.28 ({})", self.file_name),
            BlockLayout::PackedWord => write!(f, "1.29+ ({})", self.file_name),
        }
    }
}

fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = parse_component(parts.next()?)?;
    let minor = parse_component(parts.next()?)?;
    if let Some(patch) = parts.next() {
        parse_component(patch)?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor))
}

fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

//! Custom error types for the scchunks crate.

use thiserror::Error;

use super::models::{ChunkLocation, DirectoryEntry};

/// The primary error type for all operations in this crate.
///
/// Variants fall into four groups:
/// - configuration errors (`UnsupportedVersion`, `UndetectedVersion`, `InvalidPlane`),
///   raised before anything is read;
/// - directory errors (`GuardMismatch`, `DirectoryTruncated`, `Io`), which abort the run;
/// - chunk-scoped errors (`ChunkFormat`, `ChunkIo`), which carry the offending
///   [`ChunkLocation`] and never stop other chunks from decoding;
/// - codec misuse (`FieldOverflow`) and lock poisoning.
#[derive(Debug, Error)]
pub enum ChunksError {
    /// An I/O error while reading the chunk directory region.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The version string does not name a supported Survivalcraft release.
    #[error(
        "Unsupported Survivalcraft version {0:?}. Only 1.4 to 1.28 (Chunks.dat) \
         and 1.29 or later 1.x (Chunks32.dat) are supported."
    )]
    UnsupportedVersion(String),

    /// Auto-detection could not map the file name to a layout.
    #[error(
        "Could not determine the chunks file version from {0:?}. Auto-detection \
         needs a file named Chunks.dat or Chunks32.dat; pass the version explicitly."
    )]
    UndetectedVersion(String),

    /// A plane filter argument could not be parsed.
    #[error("Invalid plane {0:?}: expected a height (0-127) or a signed offset such as +2 or -3")]
    InvalidPlane(String),

    /// The trailing guard entry does not match the selected profile.
    #[error(
        "Directory guard entry mismatch: expected {expected}, found {found}. \
         This might be the wrong file version."
    )]
    GuardMismatch {
        expected: DirectoryEntry,
        found: DirectoryEntry,
    },

    /// The source ended before the fixed-size directory region.
    #[error("Source too short for the chunk directory: expected {expected} bytes, found {found}")]
    DirectoryTruncated { expected: u64, found: u64 },

    /// A single chunk is malformed; other chunks are unaffected.
    #[error("Chunk {location}: {fault}")]
    ChunkFormat {
        location: ChunkLocation,
        fault: ChunkFault,
    },

    /// An I/O error while reading a single chunk.
    #[error("Chunk {location}: I/O error: {source}")]
    ChunkIo {
        location: ChunkLocation,
        #[source]
        source: std::io::Error,
    },

    /// A value passed to a packer does not fit its bit field.
    #[error("Value {value} does not fit the {field} field (maximum {max})")]
    FieldOverflow {
        field: &'static str,
        value: u32,
        max: u32,
    },

    /// The mutex guarding the byte source was poisoned by a panicking worker.
    #[error("A mutex lock was poisoned by a panic in another thread holding it.")]
    LockPoisoned,
}

/// The reason a chunk failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkFault {
    #[error(
        "{field} == {found:#010X}, expected {expected:#010X}. \
         This might be the wrong file version"
    )]
    BadMagic {
        field: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("header coordinates ({header_x}, {header_z}) disagree with the directory entry")]
    CoordinateMismatch { header_x: i32, header_z: i32 },

    #[error("truncated {section}: expected {expected} bytes, found {found}")]
    Truncated {
        section: &'static str,
        expected: u64,
        found: u64,
    },

    #[error("offset points inside the chunk directory")]
    OffsetInDirectory,
}

impl ChunksError {
    /// The chunk this error is scoped to, if any.
    pub fn location(&self) -> Option<&ChunkLocation> {
        match self {
            ChunksError::ChunkFormat { location, .. } | ChunksError::ChunkIo { location, .. } => {
                Some(location)
            }
            _ => None,
        }
    }

    /// Returns `true` for errors that only affect one chunk.
    ///
    /// Everything else aborts the run.
    pub fn is_chunk_scoped(&self) -> bool {
        self.location().is_some()
    }

    pub(crate) fn chunk_format(location: ChunkLocation, fault: ChunkFault) -> Self {
        ChunksError::ChunkFormat { location, fault }
    }
}

/// A convenience `Result` type alias using the crate's `ChunksError` type.
pub type Result<T> = std::result::Result<T, ChunksError>;

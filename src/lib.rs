//! # scchunks
//!
//! A decoder for Survivalcraft world chunk files.
//! Supports `Chunks.dat` (versions 1.4 to 1.28, byte-pair blocks) and
//! `Chunks32.dat` (1.29 onwards, packed 32-bit blocks).
//!
//! The decoder validates the chunk directory against the selected version,
//! checks every chunk header, and streams block or surface records lazily.
//! Chunk-level problems are reported per chunk without stopping the run.
pub mod chunks;

// Re-export the main types for convenience
pub use chunks::{
    ChunkFault, ChunksError, ChunksReader, Result,
    iter::{ChunkIter, Locations, PlaneIter, RecordIter},
    plane::Plane,
    types::{
        models::{
            Block, BlockRecord, Chunk, ChunkHeader, ChunkLocation, DecodedChunk, DirectoryEntry,
            SurfacePoint, SurfaceRecord, Warning,
        },
        options::{DecodeOptions, ErrorPolicy},
        profile::{BlockLayout, VersionProfile},
        sections::{Blocks, Section, Surface},
    },
};

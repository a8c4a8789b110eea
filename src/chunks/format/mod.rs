//! File format parsing layer for chunks files.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw byte-source I/O and the high-level [`ChunksReader`](crate::ChunksReader).
//!
//! # Module Organization
//!
//! - [`directory`]: Parses and validates the fixed-size chunk directory
//! - [`chunk`]: Reads chunk headers and sections, turns cells into records
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌──────────────────────┐
//! │  Directory           │ ← directory::Directory::read()
//! │  65536 × 12 bytes    │
//! │  + 12-byte guard     │
//! ├──────────────────────┤
//! │  Chunk (any offset)  │ ← chunk::read_raw()
//! │  ├ header  16 bytes  │
//! │  ├ blocks  32768 ×   │ ← chunk::decode_block_records()
//! │  │         2|4 bytes │
//! │  └ surface 256 × 4   │ ← chunk::decode_surface_records()
//! ├──────────────────────┤
//! │  ...                 │
//! └──────────────────────┘
//! ```
//!
//! All multi-byte fields are little-endian.

pub mod chunk;
pub mod directory;

/// Number of chunk slots in the directory.
pub const DIRECTORY_SLOTS: usize = 64 * 1024;

/// Size of one directory slot: chunk x, chunk z, offset.
pub const DIRECTORY_ENTRY_SIZE: usize = 12;

/// Size of the whole directory region, including the guard slot (786444 bytes).
pub const DIRECTORY_SIZE: usize = (DIRECTORY_SLOTS + 1) * DIRECTORY_ENTRY_SIZE;

/// First magic word of every chunk header, shared by both layouts.
pub const CHUNK_MAGIC: u32 = 0xDEAD_BEEF;

/// Size of a chunk header: two magic words and the chunk coordinates.
pub const CHUNK_HEADER_SIZE: usize = 16;

/// Size of one surface cell: height, climate nibbles, two reserved bytes.
pub const SURFACE_CELL_SIZE: usize = 4;

/// Size of a chunk's surface section.
pub const SURFACE_SECTION_SIZE: usize =
    crate::chunks::types::models::SURFACE_POINTS_PER_CHUNK * SURFACE_CELL_SIZE;

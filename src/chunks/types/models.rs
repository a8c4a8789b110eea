//! Core data structures for chunks file components.
//!
//! This module defines the fundamental types used throughout the library:
//! - Directory entries and the locations derived from them
//! - Chunk headers and decoded chunks
//! - Blocks, surface points and the records emitted per chunk
//! - Non-fatal anomalies reported alongside the records

use std::fmt;

/// Chunk extent along x, in blocks.
pub const CHUNK_SIZE_X: usize = 16;
/// Chunk extent along z, in blocks.
pub const CHUNK_SIZE_Z: usize = 16;
/// Chunk extent along the vertical y axis, in blocks.
pub const CHUNK_HEIGHT: usize = 128;
/// Number of blocks stored per chunk.
pub const BLOCKS_PER_CHUNK: usize = CHUNK_SIZE_X * CHUNK_SIZE_Z * CHUNK_HEIGHT;
/// Number of surface columns stored per chunk.
pub const SURFACE_POINTS_PER_CHUNK: usize = CHUNK_SIZE_X * CHUNK_SIZE_Z;

/// One 12-byte slot of the chunk directory.
///
/// The trailing guard slot uses the same shape but carries no chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectoryEntry {
    pub chunk_x: i32,
    pub chunk_z: i32,
    /// Absolute byte offset of the chunk, or the profile's "unused" sentinel.
    pub offset: i32,
}

impl DirectoryEntry {
    pub const fn new(chunk_x: i32, chunk_z: i32, offset: i32) -> Self {
        Self { chunk_x, chunk_z, offset }
    }

    /// An entry with every field set to `value`.
    pub const fn filled(value: i32) -> Self {
        Self::new(value, value, value)
    }
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}) @ {}", self.chunk_x, self.chunk_z, self.offset)
    }
}

/// A valid directory entry together with the slot it came from.
///
/// Every chunk-scoped error and warning is keyed by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkLocation {
    /// Slot index in the directory (0..65536).
    pub index: usize,
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub offset: i32,
}

impl ChunkLocation {
    pub fn new(index: usize, entry: DirectoryEntry) -> Self {
        Self {
            index,
            chunk_x: entry.chunk_x,
            chunk_z: entry.chunk_z,
            offset: entry.offset,
        }
    }
}

impl fmt::Display for ChunkLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({}, {}) at offset {} [slot {}]",
            self.chunk_x, self.chunk_z, self.offset, self.index
        )
    }
}

/// The 16-byte header at the start of every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub magic1: u32,
    pub magic2: u32,
    pub chunk_x: i32,
    pub chunk_z: i32,
}

/// Decoded state of a single voxel.
///
/// Field widths depend on the layout: the byte-pair layout holds types 0..255
/// and data 0..15, the packed-word layout types 0..1023 and data 0..262143.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Block {
    pub block_type: u16,
    pub light: u8,
    pub data: u32,
}

impl Block {
    pub const fn new(block_type: u16, light: u8, data: u32) -> Self {
        Self { block_type, light, data }
    }
}

/// Per-column summary stored after the block data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SurfacePoint {
    pub max_height: u8,
    pub temperature: u8,
    pub humidity: u8,
}

impl SurfacePoint {
    pub const fn new(max_height: u8, temperature: u8, humidity: u8) -> Self {
        Self { max_height, temperature, humidity }
    }
}

/// One decoded block with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRecord {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub local_x: u8,
    pub local_y: u8,
    pub local_z: u8,
    pub block: Block,
}

impl BlockRecord {
    /// World x coordinate of this block.
    pub fn world_x(&self) -> i64 {
        self.chunk_x as i64 * CHUNK_SIZE_X as i64 + self.local_x as i64
    }

    /// World z coordinate of this block.
    pub fn world_z(&self) -> i64 {
        self.chunk_z as i64 * CHUNK_SIZE_Z as i64 + self.local_z as i64
    }
}

/// One decoded surface column with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceRecord {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub local_x: u8,
    pub local_z: u8,
    pub point: SurfacePoint,
}

impl SurfaceRecord {
    pub fn world_x(&self) -> i64 {
        self.chunk_x as i64 * CHUNK_SIZE_X as i64 + self.local_x as i64
    }

    pub fn world_z(&self) -> i64 {
        self.chunk_z as i64 * CHUNK_SIZE_Z as i64 + self.local_z as i64
    }
}

/// A fully decoded chunk (both sections).
///
/// Produced by [`ChunksReader::read_chunk`](crate::ChunksReader::read_chunk)
/// for random access; the streaming iterators never build one.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub location: ChunkLocation,
    pub header: ChunkHeader,
    /// 32768 blocks, x slowest, then z, y fastest.
    pub blocks: Vec<Block>,
    /// 256 columns, x slowest, z fastest.
    pub surface: Vec<SurfacePoint>,
    pub warnings: Vec<Warning>,
}

impl Chunk {
    pub fn block_at(&self, x: usize, y: usize, z: usize) -> Option<&Block> {
        if x >= CHUNK_SIZE_X || y >= CHUNK_HEIGHT || z >= CHUNK_SIZE_Z {
            return None;
        }
        self.blocks.get((x * CHUNK_SIZE_Z + z) * CHUNK_HEIGHT + y)
    }

    pub fn surface_at(&self, x: usize, z: usize) -> Option<&SurfacePoint> {
        if x >= CHUNK_SIZE_X || z >= CHUNK_SIZE_Z {
            return None;
        }
        self.surface.get(x * CHUNK_SIZE_Z + z)
    }
}

/// The records of one section of one chunk, as yielded by
/// [`ChunkIter`](crate::chunks::iter::ChunkIter).
#[derive(Debug, Clone)]
pub struct DecodedChunk<T> {
    pub location: ChunkLocation,
    pub header: ChunkHeader,
    pub records: Vec<T>,
    pub warnings: Vec<Warning>,
}

/// A tolerated anomaly. Decoding continues, but the caller should know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Surface cells whose two reserved bytes are not zero.
    ReservedSurfaceBytes {
        location: ChunkLocation,
        /// Number of affected columns in the chunk.
        columns: usize,
        /// First affected column as `(local_x, local_z)`.
        first: (u8, u8),
        /// Reserved bytes of the first affected column.
        reserved: [u8; 2],
    },
    /// Another directory slot already points at this offset.
    DuplicateOffset {
        location: ChunkLocation,
        first_index: usize,
    },
    /// Another directory slot already claims these coordinates.
    DuplicateCoordinates {
        location: ChunkLocation,
        first_index: usize,
    },
}

impl Warning {
    pub fn location(&self) -> &ChunkLocation {
        match self {
            Warning::ReservedSurfaceBytes { location, .. }
            | Warning::DuplicateOffset { location, .. }
            | Warning::DuplicateCoordinates { location, .. } => location,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::ReservedSurfaceBytes { location, columns, first, reserved } => write!(
                f,
                "Chunk {}: {} surface column(s) have non-zero reserved bytes, \
                 first at ({}, {}): {:02X} {:02X}",
                location, columns, first.0, first.1, reserved[0], reserved[1]
            ),
            Warning::DuplicateOffset { location, first_index } => write!(
                f,
                "Chunk {}: offset already used by slot {}",
                location, first_index
            ),
            Warning::DuplicateCoordinates { location, first_index } => write!(
                f,
                "Chunk {}: coordinates already claimed by slot {}",
                location, first_index
            ),
        }
    }
}

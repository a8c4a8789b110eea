//! # Chunk Reading & Decoding
//!
//! This module takes one directory location and turns the bytes it points at
//! into records. It sits between the high-level reader (which owns the byte
//! source) and the codec layer (which handles single cells).
//!
//! ## Responsibilities
//! 1.  **Read Header**: 16 bytes at the location's offset.
//! 2.  **Validate Header**: both magic words and the coordinates recorded in
//!     the directory.
//! 3.  **Read Section**: seek straight to the requested section (blocks,
//!     surface, or both) and read exactly its length.
//! 4.  **Decode Cells**: turn the section bytes into positioned records.
//!
//! Reading and decoding are separate so a caller holding a shared source can
//! release it before the CPU-bound decode starts.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian};
use log::{trace, warn};

use super::{
    CHUNK_HEADER_SIZE, CHUNK_MAGIC, DIRECTORY_SIZE, SURFACE_CELL_SIZE, SURFACE_SECTION_SIZE,
};
use crate::chunks::codec::{block, surface};
use crate::chunks::types::error::{ChunkFault, ChunksError, Result};
use crate::chunks::types::models::*;
use crate::chunks::types::profile::VersionProfile;
use crate::chunks::utils;

/// A byte range inside a chunk, relative to the chunk's first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub name: &'static str,
    pub offset: u64,
    pub len: usize,
}

impl SectionSpan {
    pub fn blocks(profile: &VersionProfile) -> Self {
        Self {
            name: "block section",
            offset: CHUNK_HEADER_SIZE as u64,
            len: profile.blocks_size(),
        }
    }

    pub fn surface(profile: &VersionProfile) -> Self {
        Self {
            name: "surface section",
            offset: (CHUNK_HEADER_SIZE + profile.blocks_size()) as u64,
            len: SURFACE_SECTION_SIZE,
        }
    }

    /// Blocks and surface together.
    pub fn body(profile: &VersionProfile) -> Self {
        Self {
            name: "chunk body",
            offset: CHUNK_HEADER_SIZE as u64,
            len: profile.body_size(),
        }
    }
}

/// A validated header and the undecoded bytes of one section.
#[derive(Debug)]
pub struct RawChunk {
    pub header: ChunkHeader,
    pub section: Vec<u8>,
}

/// Reads and validates the header at `location`, then reads `span`.
///
/// The header is validated before the section is touched, so a chunk with a
/// bad header costs one 16-byte read. Seeking to a section skips everything
/// in front of it without reading.
///
/// # Errors
/// All errors are chunk-scoped: `ChunkFormat` for an offset inside the
/// directory, a bad header or a short read, `ChunkIo` for other I/O failures.
pub fn read_raw<R: Read + Seek>(
    source: &mut R,
    location: &ChunkLocation,
    profile: &VersionProfile,
    span: SectionSpan,
) -> Result<RawChunk> {
    if (location.offset as i64) < DIRECTORY_SIZE as i64 {
        return Err(ChunksError::chunk_format(*location, ChunkFault::OffsetInDirectory));
    }
    let start = location.offset as u64;

    source
        .seek(SeekFrom::Start(start))
        .map_err(|e| chunk_io(location, e))?;
    let mut header_bytes = [0u8; CHUNK_HEADER_SIZE];
    read_exact_in_chunk(source, location, &mut header_bytes, "chunk header")?;

    let header = parse_header(&header_bytes);
    validate_header(&header, location, profile)?;

    if span.offset != CHUNK_HEADER_SIZE as u64 {
        source
            .seek(SeekFrom::Start(start + span.offset))
            .map_err(|e| chunk_io(location, e))?;
    }
    let mut section = vec![0u8; span.len];
    read_exact_in_chunk(source, location, &mut section, span.name)?;

    trace!("Read {} bytes of {} for chunk {}", span.len, span.name, location);
    Ok(RawChunk { header, section })
}

pub fn parse_header(bytes: &[u8; CHUNK_HEADER_SIZE]) -> ChunkHeader {
    ChunkHeader {
        magic1: LittleEndian::read_u32(&bytes[0..4]),
        magic2: LittleEndian::read_u32(&bytes[4..8]),
        chunk_x: LittleEndian::read_i32(&bytes[8..12]),
        chunk_z: LittleEndian::read_i32(&bytes[12..16]),
    }
}

/// Checks both magic words and the coordinates against the directory entry.
pub fn validate_header(
    header: &ChunkHeader,
    location: &ChunkLocation,
    profile: &VersionProfile,
) -> Result<()> {
    trace!(
        "Chunk header: magic1={:#010X}, magic2={:#010X}, x={}, z={}",
        header.magic1, header.magic2, header.chunk_x, header.chunk_z
    );
    if header.magic1 != CHUNK_MAGIC {
        return Err(ChunksError::chunk_format(
            *location,
            ChunkFault::BadMagic {
                field: "magic1",
                expected: CHUNK_MAGIC,
                found: header.magic1,
            },
        ));
    }
    if header.magic2 != profile.header_magic2 {
        return Err(ChunksError::chunk_format(
            *location,
            ChunkFault::BadMagic {
                field: "magic2",
                expected: profile.header_magic2,
                found: header.magic2,
            },
        ));
    }
    if header.chunk_x != location.chunk_x || header.chunk_z != location.chunk_z {
        return Err(ChunksError::chunk_format(
            *location,
            ChunkFault::CoordinateMismatch {
                header_x: header.chunk_x,
                header_z: header.chunk_z,
            },
        ));
    }
    Ok(())
}

/// Local `(x, y, z)` of the block at position `index` of the block section.
///
/// x varies slowest, then z, y fastest.
#[inline]
pub fn block_position(index: usize) -> (u8, u8, u8) {
    let x = index / (CHUNK_SIZE_Z * CHUNK_HEIGHT);
    let z = (index / CHUNK_HEIGHT) % CHUNK_SIZE_Z;
    let y = index % CHUNK_HEIGHT;
    (x as u8, y as u8, z as u8)
}

/// Local `(x, z)` of the column at position `index` of the surface section.
#[inline]
pub fn surface_position(index: usize) -> (u8, u8) {
    ((index / CHUNK_SIZE_Z) as u8, (index % CHUNK_SIZE_Z) as u8)
}

/// Decodes a block section into bare blocks, in storage order.
pub fn decode_blocks(bytes: &[u8], profile: &VersionProfile) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(BLOCKS_PER_CHUNK);
    block::decode_cells(profile.block_layout, bytes, &mut blocks);
    blocks
}

/// Decodes a block section into positioned records.
pub fn decode_block_records(
    location: &ChunkLocation,
    bytes: &[u8],
    profile: &VersionProfile,
) -> Vec<BlockRecord> {
    decode_blocks(bytes, profile)
        .into_iter()
        .enumerate()
        .map(|(index, block)| {
            let (local_x, local_y, local_z) = block_position(index);
            BlockRecord {
                chunk_x: location.chunk_x,
                chunk_z: location.chunk_z,
                local_x,
                local_y,
                local_z,
                block,
            }
        })
        .collect()
}

/// Decodes a surface section into bare points, in storage order.
///
/// Columns with non-zero reserved bytes are still decoded; one summarising
/// [`Warning`] per chunk is pushed to `warnings`.
pub fn decode_surface(
    location: &ChunkLocation,
    bytes: &[u8],
    warnings: &mut Vec<Warning>,
) -> Vec<SurfacePoint> {
    let mut points = Vec::with_capacity(SURFACE_POINTS_PER_CHUNK);
    let mut anomaly: Option<((u8, u8), [u8; 2])> = None;
    let mut columns = 0;

    for (index, cell) in bytes.chunks_exact(SURFACE_CELL_SIZE).enumerate() {
        let mut raw = [0u8; SURFACE_CELL_SIZE];
        raw.copy_from_slice(cell);
        let (point, reserved) = surface::unpack(&raw);
        if reserved != [0, 0] {
            columns += 1;
            anomaly.get_or_insert((surface_position(index), reserved));
        }
        points.push(point);
    }

    if let Some((first, reserved)) = anomaly {
        let warning = Warning::ReservedSurfaceBytes {
            location: *location,
            columns,
            first,
            reserved,
        };
        warn!("{}", warning);
        warnings.push(warning);
    }
    points
}

/// Decodes a surface section into positioned records.
pub fn decode_surface_records(
    location: &ChunkLocation,
    bytes: &[u8],
    warnings: &mut Vec<Warning>,
) -> Vec<SurfaceRecord> {
    decode_surface(location, bytes, warnings)
        .into_iter()
        .enumerate()
        .map(|(index, point)| {
            let (local_x, local_z) = surface_position(index);
            SurfaceRecord {
                chunk_x: location.chunk_x,
                chunk_z: location.chunk_z,
                local_x,
                local_z,
                point,
            }
        })
        .collect()
}

/// Reads one whole chunk (header, blocks and surface) from `source`.
pub fn read_chunk<R: Read + Seek>(
    source: &mut R,
    location: &ChunkLocation,
    profile: &VersionProfile,
) -> Result<Chunk> {
    let raw = read_raw(source, location, profile, SectionSpan::body(profile))?;
    Ok(decode_chunk(location, raw, profile))
}

/// Decodes the body read with [`SectionSpan::body`].
pub fn decode_chunk(location: &ChunkLocation, raw: RawChunk, profile: &VersionProfile) -> Chunk {
    let (block_bytes, surface_bytes) = raw.section.split_at(profile.blocks_size());
    let mut warnings = Vec::new();
    let blocks = decode_blocks(block_bytes, profile);
    let surface = decode_surface(location, surface_bytes, &mut warnings);
    Chunk {
        location: *location,
        header: raw.header,
        blocks,
        surface,
        warnings,
    }
}

fn read_exact_in_chunk<R: Read>(
    source: &mut R,
    location: &ChunkLocation,
    buf: &mut [u8],
    section: &'static str,
) -> Result<()> {
    let found = utils::read_fully(source, buf).map_err(|e| chunk_io(location, e))?;
    if found < buf.len() {
        return Err(ChunksError::chunk_format(
            *location,
            ChunkFault::Truncated {
                section,
                expected: buf.len() as u64,
                found: found as u64,
            },
        ));
    }
    Ok(())
}

fn chunk_io(location: &ChunkLocation, source: std::io::Error) -> ChunksError {
    ChunksError::ChunkIo {
        location: *location,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_position_order() {
        assert_eq!(block_position(0), (0, 0, 0));
        assert_eq!(block_position(127), (0, 127, 0));
        assert_eq!(block_position(128), (0, 0, 1));
        assert_eq!(block_position(2048), (1, 0, 0));
        assert_eq!(block_position(BLOCKS_PER_CHUNK - 1), (15, 127, 15));
    }

    #[test]
    fn test_surface_position_order() {
        assert_eq!(surface_position(1), (0, 1));
        assert_eq!(surface_position(16), (1, 0));
        assert_eq!(surface_position(255), (15, 15));
    }

    #[test]
    fn test_section_spans() {
        let profile = VersionProfile::PACKED;
        assert_eq!(SectionSpan::blocks(&profile).offset, 16);
        assert_eq!(SectionSpan::surface(&profile).offset, 16 + 131072);
        assert_eq!(SectionSpan::body(&profile).len, 131072 + 1024);
    }
}

//! Bit-field codec for block cells.
//!
//! Two cell encodings exist:
//! - Byte pair (<= 1.28): `[type, data << 4 | light]`
//! - Packed word (>= 1.29): little-endian `u32`, from the least significant bit
//!   `type:10`, `light:4`, `data:18`
//!
//! Both directions are provided and round-trip exactly for every value within
//! the field widths. Packing rejects values that do not fit.

use byteorder::{ByteOrder, LittleEndian};

use crate::chunks::types::error::{ChunksError, Result};
use crate::chunks::types::models::Block;
use crate::chunks::types::profile::BlockLayout;

pub const LIGHT_MAX: u32 = 0xF;

pub const PAIR_TYPE_MAX: u32 = 0xFF;
pub const PAIR_DATA_MAX: u32 = 0xF;

pub const WORD_TYPE_MAX: u32 = 0x3FF;
pub const WORD_DATA_MAX: u32 = 0x3FFFF;

const WORD_LIGHT_SHIFT: u32 = 10;
const WORD_DATA_SHIFT: u32 = 14;

#[inline]
pub fn unpack_pair(b0: u8, b1: u8) -> Block {
    Block {
        block_type: b0 as u16,
        light: b1 & 0x0F,
        data: ((b1 >> 4) & 0x0F) as u32,
    }
}

pub fn pack_pair(block: &Block) -> Result<[u8; 2]> {
    check_field("type", block.block_type as u32, PAIR_TYPE_MAX)?;
    check_field("light", block.light as u32, LIGHT_MAX)?;
    check_field("data", block.data, PAIR_DATA_MAX)?;
    Ok([block.block_type as u8, ((block.data as u8) << 4) | block.light])
}

#[inline]
pub fn unpack_word(word: u32) -> Block {
    Block {
        block_type: (word & WORD_TYPE_MAX) as u16,
        light: ((word >> WORD_LIGHT_SHIFT) & LIGHT_MAX) as u8,
        data: (word >> WORD_DATA_SHIFT) & WORD_DATA_MAX,
    }
}

pub fn pack_word(block: &Block) -> Result<u32> {
    check_field("type", block.block_type as u32, WORD_TYPE_MAX)?;
    check_field("light", block.light as u32, LIGHT_MAX)?;
    check_field("data", block.data, WORD_DATA_MAX)?;
    Ok(block.block_type as u32
        | (block.light as u32) << WORD_LIGHT_SHIFT
        | block.data << WORD_DATA_SHIFT)
}

/// Decodes a whole block section into `out`.
///
/// The layout is matched once; each arm runs a tight loop over its own cell
/// size. Trailing bytes that do not form a whole cell are ignored.
pub fn decode_cells(layout: BlockLayout, bytes: &[u8], out: &mut Vec<Block>) {
    out.reserve(bytes.len() / layout.cell_size());
    match layout {
        BlockLayout::BytePair => {
            out.extend(bytes.chunks_exact(2).map(|cell| unpack_pair(cell[0], cell[1])));
        }
        BlockLayout::PackedWord => {
            out.extend(
                bytes
                    .chunks_exact(4)
                    .map(|cell| unpack_word(LittleEndian::read_u32(cell))),
            );
        }
    }
}

/// Appends the encoded form of `block` to `out`.
pub fn encode_cell(layout: BlockLayout, block: &Block, out: &mut Vec<u8>) -> Result<()> {
    match layout {
        BlockLayout::BytePair => out.extend_from_slice(&pack_pair(block)?),
        BlockLayout::PackedWord => out.extend_from_slice(&pack_word(block)?.to_le_bytes()),
    }
    Ok(())
}

pub(crate) fn check_field(field: &'static str, value: u32, max: u32) -> Result<()> {
    if value > max {
        return Err(ChunksError::FieldOverflow { field, value, max });
    }
    Ok(())
}

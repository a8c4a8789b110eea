//! Low-level byte reading utilities

use std::io::{ErrorKind, Read};

use byteorder::{ByteOrder, LittleEndian};

use super::types::models::DirectoryEntry;

/// Fill `buf` from `reader`, stopping early only at end of input.
///
/// Returns the number of bytes read. Unlike `read_exact`, a short read is not
/// an error here, so callers can report how much of a section was present.
pub fn read_fully(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Decode a 12-byte little-endian directory slot.
///
/// `bytes` must hold at least 12 bytes.
#[inline]
pub fn parse_entry(bytes: &[u8]) -> DirectoryEntry {
    DirectoryEntry {
        chunk_x: LittleEndian::read_i32(&bytes[0..4]),
        chunk_z: LittleEndian::read_i32(&bytes[4..8]),
        offset: LittleEndian::read_i32(&bytes[8..12]),
    }
}

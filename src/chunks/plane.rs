//! Horizontal plane selection for block output.
//!
//! A plane is either a fixed height (`64`) or an offset from each column's
//! surface height (`+1`, `-3`). Relative planes follow the terrain, so they
//! need the surface section of the same chunk.

use std::str::FromStr;

use super::types::error::ChunksError;
use super::types::models::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Blocks whose local y equals this height.
    Absolute(u8),
    /// Blocks at this offset from the column's maximum height.
    Relative(i32),
}

impl Plane {
    /// The y selected in a column, or `None` if it falls outside the chunk.
    pub fn height_in(&self, surface: &SurfacePoint) -> Option<u8> {
        let y = match *self {
            Plane::Absolute(y) => y as i32,
            Plane::Relative(delta) => surface.max_height as i32 + delta,
        };
        (0..CHUNK_HEIGHT as i32).contains(&y).then_some(y as u8)
    }

    /// Picks at most one block per column, x slowest, z fastest.
    pub fn select(&self, chunk: &Chunk) -> Vec<BlockRecord> {
        let mut records = Vec::with_capacity(SURFACE_POINTS_PER_CHUNK);
        for x in 0..CHUNK_SIZE_X {
            for z in 0..CHUNK_SIZE_Z {
                let Some(y) = chunk.surface_at(x, z).and_then(|s| self.height_in(s)) else {
                    continue;
                };
                if let Some(block) = chunk.block_at(x, y as usize, z) {
                    records.push(BlockRecord {
                        chunk_x: chunk.location.chunk_x,
                        chunk_z: chunk.location.chunk_z,
                        local_x: x as u8,
                        local_y: y,
                        local_z: z as u8,
                        block: *block,
                    });
                }
            }
        }
        records
    }
}

impl FromStr for Plane {
    type Err = ChunksError;

    /// Parses `"64"` as an absolute height and `"+2"` / `"-3"` as offsets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChunksError::InvalidPlane(s.to_string());
        let trimmed = s.trim();
        if trimmed.starts_with(['+', '-']) {
            return trimmed.parse().map(Plane::Relative).map_err(|_| invalid());
        }
        match trimmed.parse::<u8>() {
            Ok(y) if (y as usize) < CHUNK_HEIGHT => Ok(Plane::Absolute(y)),
            _ => Err(invalid()),
        }
    }
}

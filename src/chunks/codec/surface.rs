//! Surface cell codec.
//!
//! A surface cell is 4 bytes: maximum height, a climate byte holding
//! temperature (low nibble) and humidity (high nibble), then two bytes that
//! are currently unused and written as zero.

use crate::chunks::format::SURFACE_CELL_SIZE;
use crate::chunks::types::error::Result;
use crate::chunks::types::models::SurfacePoint;

use super::block::check_field;

pub const CLIMATE_MAX: u32 = 0xF;

/// Splits a cell into its point and the raw reserved bytes.
#[inline]
pub fn unpack(cell: &[u8; SURFACE_CELL_SIZE]) -> (SurfacePoint, [u8; 2]) {
    let point = SurfacePoint {
        max_height: cell[0],
        temperature: cell[1] & 0x0F,
        humidity: (cell[1] >> 4) & 0x0F,
    };
    (point, [cell[2], cell[3]])
}

/// Encodes a point with zeroed reserved bytes.
pub fn pack(point: &SurfacePoint) -> Result<[u8; SURFACE_CELL_SIZE]> {
    check_field("temperature", point.temperature as u32, CLIMATE_MAX)?;
    check_field("humidity", point.humidity as u32, CLIMATE_MAX)?;
    Ok([point.max_height, (point.humidity << 4) | point.temperature, 0, 0])
}

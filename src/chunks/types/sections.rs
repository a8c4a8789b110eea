//! Specialization logic for the two chunk sections (blocks vs. surface).
//!
//! The extraction mode is picked once per run as a type parameter, so the
//! record streams never re-check it per chunk or per cell.

use super::models::{BlockRecord, ChunkLocation, SurfaceRecord, Warning};
use super::profile::VersionProfile;
use crate::chunks::format::chunk::{self, SectionSpan};

/// A trait that defines how one section of a chunk is located and decoded.
pub trait Section {
    /// A short name used for debugging and logging.
    const NAME: &'static str;

    /// The record type this section produces.
    type Record: Send;

    /// Where the section lives inside a chunk under `profile`.
    fn span(profile: &VersionProfile) -> SectionSpan;

    /// Turns the section's raw bytes into records.
    ///
    /// Tolerated anomalies are appended to `warnings`.
    fn decode(
        location: &ChunkLocation,
        bytes: &[u8],
        profile: &VersionProfile,
        warnings: &mut Vec<Warning>,
    ) -> Vec<Self::Record>;
}

/// Zero-cost marker for the 32768-cell block section.
#[derive(Debug)]
pub struct Blocks;

impl Section for Blocks {
    const NAME: &'static str = "blocks";
    type Record = BlockRecord;

    fn span(profile: &VersionProfile) -> SectionSpan {
        SectionSpan::blocks(profile)
    }

    fn decode(
        location: &ChunkLocation,
        bytes: &[u8],
        profile: &VersionProfile,
        _warnings: &mut Vec<Warning>,
    ) -> Vec<Self::Record> {
        chunk::decode_block_records(location, bytes, profile)
    }
}

/// Zero-cost marker for the 256-cell surface section.
#[derive(Debug)]
pub struct Surface;

impl Section for Surface {
    const NAME: &'static str = "surface";
    type Record = SurfaceRecord;

    fn span(profile: &VersionProfile) -> SectionSpan {
        SectionSpan::surface(profile)
    }

    fn decode(
        location: &ChunkLocation,
        bytes: &[u8],
        _profile: &VersionProfile,
        warnings: &mut Vec<Warning>,
    ) -> Vec<Self::Record> {
        chunk::decode_surface_records(location, bytes, warnings)
    }
}

//! # Chunk Directory
//!
//! The directory occupies the first 786444 bytes of every chunks file:
//! 65536 slots of `(chunk_x, chunk_z, offset)`, each an `i32`, followed by
//! one guard slot whose value identifies the layout.
//!
//! The region is read once into a fixed-size arena and validated against the
//! profile's guard sentinel. Slots are then decoded lazily, in directory
//! order, as the caller iterates.

use std::collections::HashMap;
use std::io::Read;

use log::{debug, info, trace, warn};

use super::{DIRECTORY_ENTRY_SIZE, DIRECTORY_SIZE, DIRECTORY_SLOTS};
use crate::chunks::types::error::{ChunksError, Result};
use crate::chunks::types::models::{ChunkLocation, DirectoryEntry, Warning};
use crate::chunks::types::profile::VersionProfile;
use crate::chunks::utils;

/// The parsed, guard-validated chunk directory.
#[derive(Debug)]
pub struct Directory {
    /// Exactly `DIRECTORY_SIZE` bytes.
    raw: Box<[u8]>,
    profile: VersionProfile,
}

impl Directory {
    /// Reads the directory region from the current position of `source`.
    ///
    /// # Errors
    /// - `DirectoryTruncated` if fewer than 786444 bytes are available
    /// - `GuardMismatch` if the guard slot does not match `profile`
    /// - `Io` on read failure
    pub fn read<R: Read>(source: &mut R, profile: VersionProfile) -> Result<Self> {
        info!("Reading chunk directory ({} slots)", DIRECTORY_SLOTS);

        let mut raw = vec![0u8; DIRECTORY_SIZE].into_boxed_slice();
        let found = utils::read_fully(source, &mut raw)?;
        if found < DIRECTORY_SIZE {
            return Err(ChunksError::DirectoryTruncated {
                expected: DIRECTORY_SIZE as u64,
                found: found as u64,
            });
        }

        let directory = Self { raw, profile };
        let guard = directory.guard();
        trace!("Guard entry: {}", guard);
        if guard != profile.guard_sentinel {
            return Err(ChunksError::GuardMismatch {
                expected: profile.guard_sentinel,
                found: guard,
            });
        }

        debug!("Directory guard matches profile {}", profile);
        Ok(directory)
    }

    pub fn profile(&self) -> &VersionProfile {
        &self.profile
    }

    /// Returns the raw slot at `index`, used or not.
    pub fn entry(&self, index: usize) -> Option<DirectoryEntry> {
        (index < DIRECTORY_SLOTS).then(|| self.slot(index))
    }

    /// The trailing guard slot.
    pub fn guard(&self) -> DirectoryEntry {
        self.slot(DIRECTORY_SLOTS)
    }

    /// Lazily iterates the used slots in directory order.
    pub fn iter(&self) -> DirectoryIter<'_> {
        DirectoryIter {
            directory: self,
            next_index: 0,
        }
    }

    /// Number of used slots. Scans the whole table.
    pub fn len_valid(&self) -> usize {
        self.iter().count()
    }

    #[inline]
    fn slot(&self, index: usize) -> DirectoryEntry {
        let start = index * DIRECTORY_ENTRY_SIZE;
        utils::parse_entry(&self.raw[start..start + DIRECTORY_ENTRY_SIZE])
    }
}

/// Iterator over the used slots of a [`Directory`].
///
/// Created by [`Directory::iter()`].
#[derive(Debug, Clone)]
pub struct DirectoryIter<'a> {
    directory: &'a Directory,
    next_index: usize,
}

impl Iterator for DirectoryIter<'_> {
    type Item = ChunkLocation;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < DIRECTORY_SLOTS {
            let index = self.next_index;
            self.next_index += 1;

            let entry = self.directory.slot(index);
            if self.directory.profile.is_used(&entry) {
                return Some(ChunkLocation::new(index, entry));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(DIRECTORY_SLOTS - self.next_index))
    }
}

/// Tracks offsets and coordinates already seen during one scan.
///
/// The format does not forbid two slots sharing an offset or coordinates, and
/// nothing is deduplicated; each repeat is recorded as a [`Warning`].
#[derive(Debug, Default)]
pub struct LocationAudit {
    offsets: HashMap<i32, usize>,
    coordinates: HashMap<(i32, i32), usize>,
}

impl LocationAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `location` and pushes a warning for every repeat it introduces.
    pub fn check(&mut self, location: &ChunkLocation, warnings: &mut Vec<Warning>) {
        if let Some(&first_index) = self.offsets.get(&location.offset) {
            let warning = Warning::DuplicateOffset {
                location: *location,
                first_index,
            };
            warn!("{}", warning);
            warnings.push(warning);
        } else {
            self.offsets.insert(location.offset, location.index);
        }

        let coordinates = (location.chunk_x, location.chunk_z);
        if let Some(&first_index) = self.coordinates.get(&coordinates) {
            let warning = Warning::DuplicateCoordinates {
                location: *location,
                first_index,
            };
            warn!("{}", warning);
            warnings.push(warning);
        } else {
            self.coordinates.insert(coordinates, location.index);
        }
    }
}

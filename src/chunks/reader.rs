use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex};

use log::{debug, info};

use super::format::chunk::{self, RawChunk, SectionSpan};
use super::format::directory::Directory;
use super::iter::{ChunkIter, Locations, PlaneIter, RecordIter};
use super::plane::Plane;
use super::types::error::{ChunksError, Result};
use super::types::models::*;
use super::types::options::DecodeOptions;
use super::types::profile::VersionProfile;
use super::types::sections::{Blocks, Section, Surface};

/// The main reader for Survivalcraft chunks files.
///
/// Reads `Chunks.dat` (1.4 to 1.28) and `Chunks32.dat` (1.29 onwards).
/// Construction resolves the version profile and validates the directory;
/// chunks are only read when one of the iterators (or
/// [`read_chunk`](Self::read_chunk)) asks for them.
#[derive(Debug)]
pub struct ChunksReader<R> {
    source: Arc<Mutex<R>>,
    profile: VersionProfile,
    directory: Directory,
}

impl ChunksReader<File> {
    /// Opens a chunks file from the given path.
    ///
    /// With `version == None` the layout is detected from the file name
    /// (`Chunks.dat` or `Chunks32.dat`).
    ///
    /// # Errors
    /// Returns an error if:
    /// - The version string is unsupported, or auto-detection fails
    /// - The file cannot be opened
    /// - The directory is truncated or its guard does not match the version
    pub fn open(path: impl AsRef<Path>, version: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let profile = match version {
            Some(version) => VersionProfile::from_version(version)?,
            None => VersionProfile::from_path(path)?,
        };
        info!("Opening chunks file: {} as {}", path.display(), profile);
        let file = File::open(path)?;
        Self::with_profile(file, profile)
    }
}

impl<R: Read + Seek + Send> ChunksReader<R> {
    /// Wraps an arbitrary byte source, resolving `version` first.
    pub fn new(source: R, version: &str) -> Result<Self> {
        let profile = VersionProfile::from_version(version)?;
        Self::with_profile(source, profile)
    }

    /// Wraps an arbitrary byte source with an already resolved profile.
    pub fn with_profile(mut source: R, profile: VersionProfile) -> Result<Self> {
        source.seek(SeekFrom::Start(0))?;
        let directory = Directory::read(&mut source, profile)?;
        info!(
            "Chunks file opened: {} used directory slots, layout {}",
            directory.len_valid(),
            profile
        );

        Ok(Self {
            source: Arc::new(Mutex::new(source)),
            profile,
            directory,
        })
    }

    pub fn profile(&self) -> &VersionProfile {
        &self.profile
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Lazily yields the used directory slots in directory order.
    ///
    /// Repeated offsets and coordinates are passed through and recorded as
    /// warnings on the returned iterator.
    pub fn locations(&self) -> Locations<'_> {
        Locations::new(self.directory.iter())
    }

    /// Returns a per-chunk stream of one section's records.
    ///
    /// Each item is either a [`DecodedChunk`] or a chunk-scoped error.
    pub fn iter_chunks<S: Section>(&self, options: DecodeOptions) -> ChunkIter<'_, R, S> {
        ChunkIter::new(self, options)
    }

    /// Returns a flat record stream over one section of every chunk.
    ///
    /// Chunk-scoped errors appear in-line as `Err` items; warnings are
    /// collected on the iterator (see [`RecordIter::warnings`]).
    pub fn iter_records<S: Section>(&self, options: DecodeOptions) -> RecordIter<'_, R, S> {
        RecordIter::new(self.iter_chunks(options))
    }

    /// Sequential best-effort stream of block records.
    pub fn iter_blocks(&self) -> RecordIter<'_, R, Blocks> {
        self.iter_records(DecodeOptions::default())
    }

    /// Sequential best-effort stream of surface records.
    ///
    /// Block sections are skipped with a seek and never read.
    pub fn iter_surface(&self) -> RecordIter<'_, R, Surface> {
        self.iter_records(DecodeOptions::default())
    }

    /// Block records lying on one horizontal plane.
    ///
    /// Only `options.policy` applies; plane filtering decodes sequentially.
    pub fn iter_plane(&self, plane: Plane, options: DecodeOptions) -> PlaneIter<'_, R> {
        PlaneIter::new(self, plane, options)
    }

    /// Reads and decodes one section of the chunk at `location`.
    pub fn read_section<S: Section>(
        &self,
        location: &ChunkLocation,
    ) -> Result<DecodedChunk<S::Record>> {
        let raw = self.read_raw(location, S::span(&self.profile))?;
        let mut warnings = Vec::new();
        let records = S::decode(location, &raw.section, &self.profile, &mut warnings);
        debug!(
            "Decoded {} {} records from chunk {}",
            records.len(),
            S::NAME,
            location
        );
        Ok(DecodedChunk {
            location: *location,
            header: raw.header,
            records,
            warnings,
        })
    }

    /// Reads and decodes the whole chunk at `location` (random access).
    pub fn read_chunk(&self, location: &ChunkLocation) -> Result<Chunk> {
        let raw = self.read_raw(location, SectionSpan::body(&self.profile))?;
        Ok(chunk::decode_chunk(location, raw, &self.profile))
    }

    /// Reads the raw bytes of one section while holding the source lock.
    ///
    /// Decoding happens after the lock is released.
    fn read_raw(&self, location: &ChunkLocation, span: SectionSpan) -> Result<RawChunk> {
        let mut source = self.source.lock().map_err(|_| ChunksError::LockPoisoned)?;
        chunk::read_raw(&mut *source, location, &self.profile, span)
    }
}

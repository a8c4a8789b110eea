//! Iterators for sequential and parallel access to chunk data.
//!
//! This module provides a layered iterator design:
//!
//! 1. [`Locations`] - Used directory slots, in directory order
//! 2. [`ChunkIter`] - One decoded section per location, or a chunk error
//! 3. [`RecordIter`] - The records of those sections, flattened
//! 4. [`PlaneIter`] - Block records restricted to one horizontal plane
//!
//! Every layer is lazy: nothing past the current batch is read, so dropping an
//! iterator stops all further I/O. Tolerated anomalies are collected on the
//! iterator as [`Warning`]s, a stream running alongside the records.
//!
//! # Example
//! ```no_run
//! # use scchunks::ChunksReader;
//! let reader = ChunksReader::open("Chunks32.dat", None).unwrap();
//! for result in reader.iter_surface() {
//!     match result {
//!         Ok(record) => println!("{:?}", record),
//!         Err(e) => eprintln!("skipped: {}", e),
//!     }
//! }
//! ```

use std::collections::VecDeque;
use std::io::{Read, Seek};
use std::marker::PhantomData;
use std::vec::IntoIter;

use log::{debug, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::format::directory::{DirectoryIter, LocationAudit};
use super::plane::Plane;
use super::reader::ChunksReader;
use super::types::error::Result;
use super::types::models::{BlockRecord, ChunkLocation, DecodedChunk, Warning};
use super::types::options::{DecodeOptions, ErrorPolicy};
use super::types::sections::Section;

/// Iterator over the used directory slots.
///
/// Created by [`ChunksReader::locations()`](crate::ChunksReader::locations).
pub struct Locations<'a> {
    entries: DirectoryIter<'a>,
    audit: LocationAudit,
    warnings: Vec<Warning>,
}

impl<'a> Locations<'a> {
    pub(super) fn new(entries: DirectoryIter<'a>) -> Self {
        Self {
            entries,
            audit: LocationAudit::new(),
            warnings: Vec::new(),
        }
    }

    /// Warnings raised by the slots yielded so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Drains the collected warnings.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

impl Iterator for Locations<'_> {
    type Item = ChunkLocation;

    fn next(&mut self) -> Option<Self::Item> {
        let location = self.entries.next()?;
        self.audit.check(&location, &mut self.warnings);
        Some(location)
    }
}

/// Iterator over decoded chunk sections.
///
/// With more than one thread configured, chunks are decoded in batches on a
/// dedicated rayon pool. Each batch is collected in directory order, so the
/// output sequence is identical to sequential decoding.
///
/// Created by [`ChunksReader::iter_chunks()`](crate::ChunksReader::iter_chunks).
pub struct ChunkIter<'a, R, S: Section> {
    reader: &'a ChunksReader<R>,
    locations: Locations<'a>,
    options: DecodeOptions,
    pool: Option<ThreadPool>,
    pending: VecDeque<Result<DecodedChunk<S::Record>>>,
    finished: bool,
    _section: PhantomData<S>,
}

impl<'a, R: Read + Seek + Send, S: Section> ChunkIter<'a, R, S> {
    pub(super) fn new(reader: &'a ChunksReader<R>, options: DecodeOptions) -> Self {
        let pool = if options.is_parallel() {
            match ThreadPoolBuilder::new().num_threads(options.threads).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!(
                        "Failed to start {} decode threads ({}), decoding sequentially",
                        options.threads, e
                    );
                    None
                }
            }
        } else {
            None
        };
        debug!("Decoding {} sections with {:?}", S::NAME, options);

        Self {
            reader,
            locations: reader.locations(),
            options,
            pool,
            pending: VecDeque::new(),
            finished: false,
            _section: PhantomData,
        }
    }

    /// Directory warnings for the locations consumed so far.
    ///
    /// Chunk-level warnings travel inside each [`DecodedChunk`].
    pub fn warnings(&self) -> &[Warning] {
        self.locations.warnings()
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        self.locations.take_warnings()
    }

    /// Decodes the next batch of locations into `pending`.
    ///
    /// Returns `false` once the directory is exhausted.
    fn fill(&mut self) -> bool {
        let window = self.options.window();
        let batch: Vec<ChunkLocation> = self.locations.by_ref().take(window).collect();
        if batch.is_empty() {
            return false;
        }

        let reader = self.reader;
        match &self.pool {
            Some(pool) => {
                let decoded: Vec<_> = pool.install(|| {
                    batch
                        .par_iter()
                        .map(|location| reader.read_section::<S>(location))
                        .collect()
                });
                self.pending.extend(decoded);
            }
            None => {
                self.pending
                    .extend(batch.iter().map(|location| reader.read_section::<S>(location)));
            }
        }
        true
    }
}

impl<R: Read + Seek + Send, S: Section> Iterator for ChunkIter<'_, R, S> {
    type Item = Result<DecodedChunk<S::Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                if let Err(e) = &item {
                    debug!("Chunk error: {}", e);
                    if self.options.policy == ErrorPolicy::FailFast {
                        debug!(
                            "Fail-fast: dropping {} decoded chunk(s) and the rest of the directory",
                            self.pending.len()
                        );
                        self.pending.clear();
                        self.finished = true;
                    }
                }
                return Some(item);
            }

            if self.finished || !self.fill() {
                self.finished = true;
                return None;
            }
        }
    }
}

/// Iterator over the records of every chunk, flattened.
///
/// Yields `Result<S::Record>`; an `Err` item is a chunk-scoped error and (in
/// best-effort mode) the stream continues with the next chunk.
///
/// Created by [`ChunksReader::iter_records()`](crate::ChunksReader::iter_records).
pub struct RecordIter<'a, R, S: Section> {
    chunks: ChunkIter<'a, R, S>,
    current: IntoIter<S::Record>,
    warnings: Vec<Warning>,
}

impl<'a, R: Read + Seek + Send, S: Section> RecordIter<'a, R, S> {
    pub(super) fn new(chunks: ChunkIter<'a, R, S>) -> Self {
        Self {
            chunks,
            current: Vec::new().into_iter(),
            warnings: Vec::new(),
        }
    }

    /// Directory and chunk warnings collected so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Drains the collected warnings, keeping memory bounded on long runs.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

impl<R: Read + Seek + Send, S: Section> Iterator for RecordIter<'_, R, S> {
    type Item = Result<S::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.current.next() {
                return Some(Ok(record));
            }

            let item = self.chunks.next();
            self.warnings.extend(self.chunks.take_warnings());
            match item? {
                Ok(decoded) => {
                    self.warnings.extend(decoded.warnings);
                    self.current = decoded.records.into_iter();
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Iterator over block records on one horizontal plane.
///
/// Reads whole chunks sequentially, since relative planes need each
/// column's surface height.
///
/// Created by [`ChunksReader::iter_plane()`](crate::ChunksReader::iter_plane).
pub struct PlaneIter<'a, R> {
    reader: &'a ChunksReader<R>,
    locations: Locations<'a>,
    plane: Plane,
    policy: ErrorPolicy,
    current: IntoIter<BlockRecord>,
    warnings: Vec<Warning>,
    finished: bool,
}

impl<'a, R: Read + Seek + Send> PlaneIter<'a, R> {
    pub(super) fn new(reader: &'a ChunksReader<R>, plane: Plane, options: DecodeOptions) -> Self {
        Self {
            reader,
            locations: reader.locations(),
            plane,
            policy: options.policy,
            current: Vec::new().into_iter(),
            warnings: Vec::new(),
            finished: false,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

impl<R: Read + Seek + Send> Iterator for PlaneIter<'_, R> {
    type Item = Result<BlockRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.current.next() {
                return Some(Ok(record));
            }
            if self.finished {
                return None;
            }

            let location = self.locations.next();
            self.warnings.extend(self.locations.take_warnings());
            let Some(location) = location else {
                self.finished = true;
                return None;
            };

            match self.reader.read_chunk(&location) {
                Ok(chunk) => {
                    self.current = self.plane.select(&chunk).into_iter();
                    self.warnings.extend(chunk.warnings);
                }
                Err(e) => {
                    if self.policy == ErrorPolicy::FailFast {
                        self.finished = true;
                    }
                    return Some(Err(e));
                }
            }
        }
    }
}

//! Builders for synthetic chunks files.

#![allow(dead_code)]

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use scchunks::chunks::codec::{block, surface};
use scchunks::chunks::format::{CHUNK_MAGIC, DIRECTORY_SIZE, DIRECTORY_SLOTS};
use scchunks::{Block, DirectoryEntry, SurfacePoint, VersionProfile};

/// Lays out a directory and chunk bodies the way the game writes them.
pub struct ChunksFileBuilder {
    profile: VersionProfile,
    slots: Vec<DirectoryEntry>,
    guard: DirectoryEntry,
    body: Vec<u8>,
    next_slot: usize,
}

impl ChunksFileBuilder {
    pub fn new(profile: VersionProfile) -> Self {
        Self {
            profile,
            slots: vec![DirectoryEntry::filled(profile.unused_offset); DIRECTORY_SLOTS],
            guard: profile.guard_sentinel,
            body: Vec::new(),
            next_slot: 0,
        }
    }

    /// Absolute offset the next appended bytes will land at.
    pub fn next_offset(&self) -> i32 {
        (DIRECTORY_SIZE + self.body.len()) as i32
    }

    /// Appends a well-formed chunk and points the next free slot at it.
    pub fn add_chunk<B, S>(&mut self, chunk_x: i32, chunk_z: i32, blocks: B, surface: S) -> i32
    where
        B: Fn(usize, usize, usize) -> Block,
        S: Fn(usize, usize) -> SurfacePoint,
    {
        let bytes = chunk_bytes(&self.profile, chunk_x, chunk_z, blocks, surface);
        self.add_raw(chunk_x, chunk_z, &bytes)
    }

    /// Appends a chunk with every block and surface cell zeroed.
    pub fn add_empty_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> i32 {
        self.add_chunk(chunk_x, chunk_z, |_, _, _| Block::default(), |_, _| SurfacePoint::default())
    }

    /// Appends arbitrary bytes and points the next free slot at them.
    pub fn add_raw(&mut self, chunk_x: i32, chunk_z: i32, bytes: &[u8]) -> i32 {
        let offset = self.next_offset();
        self.body.extend_from_slice(bytes);
        let slot = self.next_slot;
        self.set_slot(slot, DirectoryEntry::new(chunk_x, chunk_z, offset));
        offset
    }

    /// Overwrites a directory slot without touching the body.
    pub fn set_slot(&mut self, index: usize, entry: DirectoryEntry) -> &mut Self {
        self.slots[index] = entry;
        self.next_slot = self.next_slot.max(index + 1);
        self
    }

    pub fn set_guard(&mut self, guard: DirectoryEntry) -> &mut Self {
        self.guard = guard;
        self
    }

    /// Overwrites body bytes at an absolute file offset.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) -> &mut Self {
        let start = offset - DIRECTORY_SIZE;
        self.body[start..start + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Drops everything past `len` bytes of the whole file.
    pub fn truncate(&mut self, len: usize) -> &mut Self {
        self.body.truncate(len.saturating_sub(DIRECTORY_SIZE));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(DIRECTORY_SIZE + self.body.len());
        for entry in self.slots.iter().chain(std::iter::once(&self.guard)) {
            out.extend_from_slice(&entry.chunk_x.to_le_bytes());
            out.extend_from_slice(&entry.chunk_z.to_le_bytes());
            out.extend_from_slice(&entry.offset.to_le_bytes());
        }
        out.extend_from_slice(&self.body);
        out
    }

    pub fn cursor(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.build())
    }
}

pub fn header_bytes(magic1: u32, magic2: u32, chunk_x: i32, chunk_z: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    out.extend_from_slice(&magic1.to_le_bytes());
    out.extend_from_slice(&magic2.to_le_bytes());
    out.extend_from_slice(&chunk_x.to_le_bytes());
    out.extend_from_slice(&chunk_z.to_le_bytes());
    out
}

/// Encodes a whole chunk: header, blocks (x, z, y order), then surface (x, z order).
pub fn chunk_bytes<B, S>(
    profile: &VersionProfile,
    chunk_x: i32,
    chunk_z: i32,
    blocks: B,
    surface: S,
) -> Vec<u8>
where
    B: Fn(usize, usize, usize) -> Block,
    S: Fn(usize, usize) -> SurfacePoint,
{
    let mut out = header_bytes(CHUNK_MAGIC, profile.header_magic2, chunk_x, chunk_z);
    out.reserve(profile.body_size());
    for x in 0..16 {
        for z in 0..16 {
            for y in 0..128 {
                block::encode_cell(profile.block_layout, &blocks(x, y, z), &mut out)
                    .expect("test block fits the layout");
            }
        }
    }
    for x in 0..16 {
        for z in 0..16 {
            out.extend_from_slice(&surface::pack(&surface(x, z)).expect("test point fits"));
        }
    }
    out
}

/// A well-formed chunk with every cell zeroed.
pub fn empty_chunk_bytes(profile: &VersionProfile, chunk_x: i32, chunk_z: i32) -> Vec<u8> {
    chunk_bytes(profile, chunk_x, chunk_z, |_, _, _| Block::default(), |_, _| {
        SurfacePoint::default()
    })
}

/// Absolute offset of the surface cell `(x, z)` of the chunk at `chunk_offset`.
pub fn surface_cell_offset(
    profile: &VersionProfile,
    chunk_offset: i32,
    x: usize,
    z: usize,
) -> usize {
    chunk_offset as usize + 16 + profile.blocks_size() + (x * 16 + z) * 4
}

/// Wraps a source and counts the bytes actually read from it.
pub struct CountingReader<R> {
    inner: R,
    read: Arc<AtomicU64>,
}

impl<R> CountingReader<R> {
    pub fn new(inner: R) -> (Self, Arc<AtomicU64>) {
        let read = Arc::new(AtomicU64::new(0));
        (
            Self {
                inner,
                read: Arc::clone(&read),
            },
            read,
        )
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read.fetch_add(n as u64, Ordering::SeqCst);
        Ok(n)
    }
}

impl<R: Seek> Seek for CountingReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

pub fn bytes_read(counter: &Arc<AtomicU64>) -> u64 {
    counter.load(Ordering::SeqCst)
}

//! Codec layer for cell-level bit packing.
//!
//! This module provides the pure encode/decode primitives used by the chunk
//! format parsers. Nothing here performs I/O.
//!
//! # Submodules
//!
//! - [`block`][]: Block cells in both layouts (byte pair, packed word)
//! - [`surface`][]: Surface cells (height, climate, reserved bytes)

pub mod block;
pub mod surface;

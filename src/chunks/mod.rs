//! Core chunks file reader module

pub mod codec;
pub mod format;
pub mod iter;
pub mod plane;
pub mod reader;
pub mod types;
mod utils;

pub use reader::ChunksReader;
pub use types::error::{ChunkFault, ChunksError, Result};

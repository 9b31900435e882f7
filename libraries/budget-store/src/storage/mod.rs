//! Slice storage backends
//!
//! - [`MemoryStorage`]: process-local map, for tests and embedding
//! - [`FileStorage`]: one JSON file per key under a data directory

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

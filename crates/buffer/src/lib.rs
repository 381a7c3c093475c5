//! # sqlscript Buffer
//!
//! A small paged file buffer with 2Q (FIFO+LRU) eviction (§4.G). This
//! crate has no dependency on anything SQL-specific; it exists to back
//! catalog or script storage that outgrows memory, and is usable on its
//! own.
//!
//! The pool is generic over [`RawFile`], so tests run against
//! [`MemoryFile`] without touching disk; production callers register
//! `std::fs::File` handles, which implement [`RawFile`] directly.

pub mod config;
pub mod error;
pub mod frame;
pub mod ids;
pub mod pool;
pub mod raw_file;

pub use config::BufferPoolConfig;
pub use error::BufferError;
pub use ids::{FileId, FrameId, PageId};
pub use pool::{Buffer, BufferRef, FileRef};
pub use raw_file::{MemoryFile, RawFile};

//! Page cache over a block device.
//!
//! A [`BufferPool`] holds a fixed number of frames, each able to hold one
//! page of the underlying [`BlockDevice`]. Callers pin a page to make it
//! resident, read or modify its bytes, and unpin it when done. When every
//! frame is occupied, a [`Replacer`] chosen by [`ReplacementStrategy`] picks
//! which unpinned page to evict; dirty victims are written back first.

mod config;
mod error;
mod frame;
mod manager;
mod page;
mod page_table;
mod pool;
pub mod replacer;
mod stats;

pub use config::{BufferPoolConfig, ReplacementStrategy};
pub use disk::{BlockDevice, DiskError, MemoryDisk, PageFile, PAGE_SIZE};
pub use error::{BufferError, Result};
pub use manager::BufferManager;
pub use page::{PageGuard, PageHandle};
pub use pool::{BufferPool, ShutdownError};
pub use replacer::Replacer;
pub use stats::{PageContent, PoolContent};

/// Page number within the backing device. Negative values are never valid
/// page numbers.
pub type PageNumber = i32;

/// Index of a frame within its pool.
pub type FrameId = usize;

/// Rendering of an empty frame in pool snapshots.
pub const NO_PAGE: PageNumber = -1;

//! Buffer pool over paged files.
//!
//! The [`disk`] crate stores fixed-size pages in a file; [`buffer_manager`]
//! caches them in a small number of frames with a selectable replacement
//! strategy. The most common types are re-exported here.
//!
//! ```no_run
//! use pagepool::{BufferPool, BufferPoolConfig, PageFile, ReplacementStrategy};
//!
//! PageFile::create("pages.bin")?;
//! let config = BufferPoolConfig::new("pages.bin")
//!     .with_capacity(8)
//!     .with_strategy(ReplacementStrategy::Lru);
//! let mut pool = BufferPool::init(&config)?;
//! {
//!     let mut page = pool.fetch(3)?;
//!     page[..5].copy_from_slice(b"hello");
//! }
//! pool.shutdown()?;
//! # Ok::<(), pagepool::BufferError>(())
//! ```

pub use buffer_manager;
pub use disk;

pub use buffer_manager::{
    BlockDevice, BufferError, BufferManager, BufferPool, BufferPoolConfig, DiskError, MemoryDisk,
    PageFile, PageGuard, PageHandle, PageNumber, ReplacementStrategy, NO_PAGE, PAGE_SIZE,
};

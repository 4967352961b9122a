use disk::DiskError;
use thiserror::Error;

use crate::PageNumber;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error(transparent)]
    Disk(#[from] DiskError),
    #[error("failed to allocate frame buffers")]
    AllocationFailed,
    #[error("buffer pool still has pinned pages")]
    PinnedPagesInBuffer,
    #[error("buffer pool is not initialized")]
    BufferPoolNotInitialized,
    #[error("page {0} is not resident in the buffer pool")]
    PageNotFound(PageNumber),
    #[error("no free buffer: every frame is pinned")]
    NoFreeBuffer,
    #[error("invalid page number {0}")]
    InvalidPageNumber(PageNumber),
    #[error("handle for page {page_number} outlived its pin")]
    StaleHandle { page_number: PageNumber },
    #[error("invalid buffer pool configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, BufferError>;

use disk::PAGE_SIZE;

use crate::{
    error::{BufferError, Result},
    PageNumber,
};

/// Identifies one pin. Unique for the lifetime of a pool.
pub(crate) type LeaseId = u64;

/// One slot of the buffer pool.
///
/// The data buffer belongs to the slot for the pool's whole lifetime and is
/// reused across residencies. Every outstanding pin is recorded as a lease,
/// oldest first; the pin count is the number of leases.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) page_number: Option<PageNumber>,
    pub(crate) data: Box<[u8]>,
    pub(crate) dirty: bool,
    leases: Vec<LeaseId>,
}

/// Allocates a zeroed page buffer, reporting allocation failure instead of
/// aborting.
pub(crate) fn allocate_block() -> Result<Box<[u8]>> {
    let mut block = Vec::new();
    block
        .try_reserve_exact(PAGE_SIZE)
        .map_err(|_| BufferError::AllocationFailed)?;
    block.resize(PAGE_SIZE, 0);
    Ok(block.into_boxed_slice())
}

impl Frame {
    pub(crate) fn empty() -> Result<Self> {
        Ok(Self {
            page_number: None,
            data: allocate_block()?,
            dirty: false,
            leases: Vec::new(),
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.page_number.is_none()
    }

    pub(crate) fn pin_count(&self) -> u32 {
        self.leases.len() as u32
    }

    pub(crate) fn is_evictable(&self) -> bool {
        self.leases.is_empty()
    }

    pub(crate) fn holds(&self, lease: LeaseId) -> bool {
        self.leases.contains(&lease)
    }

    pub(crate) fn pin(&mut self, lease: LeaseId) {
        self.leases.push(lease);
    }

    /// Retires the oldest outstanding lease. Returns false if the frame was
    /// not pinned.
    pub(crate) fn unpin(&mut self) -> bool {
        if self.leases.is_empty() {
            return false;
        }
        self.leases.remove(0);
        true
    }

    /// Retires exactly `lease`. Returns false if it was not outstanding.
    pub(crate) fn release(&mut self, lease: LeaseId) -> bool {
        match self.leases.iter().position(|&held| held == lease) {
            Some(i) => {
                self.leases.remove(i);
                true
            }
            None => false,
        }
    }
}

use std::ops::{Deref, DerefMut};

use disk::{BlockDevice, PageFile};

use crate::{frame::LeaseId, pool::BufferPool, FrameId, PageNumber};

/// Lease on a pinned page, returned by [`BufferPool::pin_page`].
///
/// The handle is a token, not a pointer: the page's bytes are reached through
/// [`BufferPool::page`] and [`BufferPool::page_mut`], which refuse the handle
/// once its own pin has been released, even if the page has been pinned
/// again since. It is deliberately not `Clone`; [`BufferPool::release`]
/// consumes it.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pinned page stays resident until it is released"]
pub struct PageHandle {
    pub(crate) page_number: PageNumber,
    pub(crate) frame_id: FrameId,
    pub(crate) lease: LeaseId,
}

impl PageHandle {
    pub(crate) fn new(page_number: PageNumber, frame_id: FrameId, lease: LeaseId) -> Self {
        Self {
            page_number,
            frame_id,
            lease,
        }
    }

    pub fn page_number(&self) -> PageNumber {
        self.page_number
    }
}

/// Scoped pin on a page, returned by [`BufferPool::fetch`].
///
/// Holds the pool mutably, so the page cannot be evicted while the guard
/// lives. Writing through the guard marks the page dirty and dropping it
/// unpins the page.
pub struct PageGuard<'a, D: BlockDevice = PageFile> {
    page_number: PageNumber,
    frame_id: FrameId,
    lease: LeaseId,
    pool: &'a mut BufferPool<D>,
}

impl<'a, D: BlockDevice> PageGuard<'a, D> {
    pub(crate) fn new(
        page_number: PageNumber,
        frame_id: FrameId,
        lease: LeaseId,
        pool: &'a mut BufferPool<D>,
    ) -> Self {
        Self {
            page_number,
            frame_id,
            lease,
            pool,
        }
    }

    pub fn page_number(&self) -> PageNumber {
        self.page_number
    }

    pub fn is_dirty(&self) -> bool {
        self.pool.frames[self.frame_id].dirty
    }
}

impl<'a, D: BlockDevice> Deref for PageGuard<'a, D> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.pool.frames[self.frame_id].data
    }
}

impl<'a, D: BlockDevice> DerefMut for PageGuard<'a, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        let frame = &mut self.pool.frames[self.frame_id];
        frame.dirty = true;
        &mut frame.data
    }
}

impl<'a, D: BlockDevice> Drop for PageGuard<'a, D> {
    fn drop(&mut self) {
        self.pool.frames[self.frame_id].release(self.lease);
    }
}

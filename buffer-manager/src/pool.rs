use std::{
    error::Error,
    fmt, mem,
    path::{Path, PathBuf},
};

use disk::{BlockDevice, DiskError, PageFile};
use log::{debug, info, warn};

use crate::{
    config::{self, BufferPoolConfig, ReplacementStrategy},
    error::{BufferError, Result},
    frame::{allocate_block, Frame, LeaseId},
    page::{PageGuard, PageHandle},
    page_table::PageTable,
    replacer::Replacer,
    FrameId, PageNumber,
};


/// Fixed-capacity page cache over a [`BlockDevice`].
///
/// All state, including the access counter and any replacer state such as a
/// clock hand, belongs to the pool, so independent pools never interact.
/// Dropping a pool without [`BufferPool::shutdown`] discards unflushed
/// changes.
pub struct BufferPool<D: BlockDevice = PageFile> {
    page_file: Option<PathBuf>,
    pub(crate) frames: Vec<Frame>,
    page_table: PageTable,
    replacer: Box<dyn Replacer>,
    storage: D,
    // Destination of every page read; swapped into the frame on success.
    staging: Box<[u8]>,
    tick: u64,
    next_lease: LeaseId,
    pub(crate) num_read_io: usize,
    pub(crate) num_write_io: usize,
}

impl BufferPool<PageFile> {
    /// Opens the configured page file and sets up empty frames.
    pub fn init(config: &BufferPoolConfig) -> Result<Self> {
        config.validate()?;
        let storage = PageFile::open(&config.page_file)?;
        let mut pool = Self::with_device(storage, config.capacity, config.strategy)?;
        pool.page_file = Some(config.page_file.clone());
        Ok(pool)
    }
}

impl<D: BlockDevice> BufferPool<D> {
    pub fn with_device(storage: D, capacity: usize, strategy: ReplacementStrategy) -> Result<Self> {
        config::validate(capacity, strategy)?;
        let frames = (0..capacity)
            .map(|_| Frame::empty())
            .collect::<Result<Vec<_>>>()?;
        let pool = Self {
            page_file: None,
            frames,
            page_table: PageTable::with_capacity(capacity),
            replacer: strategy.build(capacity),
            storage,
            staging: allocate_block()?,
            tick: 0,
            next_lease: 0,
            num_read_io: 0,
            num_write_io: 0,
        };
        info!(
            "Initialized buffer pool with {} frames using {}",
            capacity, strategy
        );
        Ok(pool)
    }

    /// Path of the backing page file, if the pool was opened from one.
    pub fn page_file(&self) -> Option<&Path> {
        self.page_file.as_deref()
    }

    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    pub fn strategy(&self) -> ReplacementStrategy {
        self.replacer.strategy()
    }

    pub fn device(&self) -> &D {
        &self.storage
    }

    /// Frame currently holding `page_number`.
    pub fn find_frame(&self, page_number: PageNumber) -> Option<FrameId> {
        self.page_table.get_frame(page_number)
    }

    /// Makes `page_number` resident and pins it.
    ///
    /// A page beyond the end of the device is created by growing the device
    /// first. Fails with [`BufferError::NoFreeBuffer`] when every frame is
    /// pinned; on any failure the pool is left as it was, apart from a dirty
    /// victim that may already have been written back.
    pub fn pin_page(&mut self, page_number: PageNumber) -> Result<PageHandle> {
        let (frame_id, lease) = self.pin_frame(page_number)?;
        Ok(PageHandle::new(page_number, frame_id, lease))
    }

    /// Pins `page_number` for the lifetime of the returned guard.
    pub fn fetch(&mut self, page_number: PageNumber) -> Result<PageGuard<'_, D>> {
        let (frame_id, lease) = self.pin_frame(page_number)?;
        Ok(PageGuard::new(page_number, frame_id, lease, self))
    }

    /// Releases one pin on `page_number`, the oldest one still outstanding.
    /// Unpinning a page nobody holds is accepted and changes nothing.
    pub fn unpin_page(&mut self, page_number: PageNumber) -> Result<()> {
        let frame_id = self.resident(page_number)?;
        if !self.frames[frame_id].unpin() {
            debug!("Page {} is resident but not pinned", page_number);
        }
        Ok(())
    }

    /// Releases the pin `handle` was issued for.
    pub fn release(&mut self, handle: PageHandle) -> Result<()> {
        let frame_id = self.check_handle(&handle)?;
        self.frames[frame_id].release(handle.lease);
        Ok(())
    }

    /// Bytes of the page `handle` refers to.
    pub fn page(&self, handle: &PageHandle) -> Result<&[u8]> {
        let frame_id = self.check_handle(handle)?;
        Ok(&self.frames[frame_id].data)
    }

    /// Mutable bytes of the page `handle` refers to. Changes are only
    /// written back once the page is marked dirty.
    pub fn page_mut(&mut self, handle: &PageHandle) -> Result<&mut [u8]> {
        let frame_id = self.check_handle(handle)?;
        Ok(&mut self.frames[frame_id].data)
    }

    pub fn mark_dirty(&mut self, page_number: PageNumber) -> Result<()> {
        let frame_id = self.resident(page_number)?;
        self.frames[frame_id].dirty = true;
        Ok(())
    }

    /// Writes `page_number` back if it is dirty. Pinned pages are written as
    /// well.
    pub fn force_page(&mut self, page_number: PageNumber) -> Result<()> {
        let frame_id = self.resident(page_number)?;
        self.write_back(frame_id)
    }

    /// Writes back every dirty page that is not pinned.
    ///
    /// A failed write does not stop the flush: every remaining page is still
    /// attempted and the first error is returned at the end. Pages whose
    /// write failed stay dirty.
    pub fn force_flush_pool(&mut self) -> Result<()> {
        let mut first_error = None;
        for frame_id in 0..self.frames.len() {
            let frame = &self.frames[frame_id];
            if frame.dirty && frame.is_evictable() {
                if let Err(e) = self.write_back(frame_id) {
                    warn!("Flush of frame {} failed: {}", frame_id, e);
                    first_error.get_or_insert(e);
                }
            } else if frame.dirty {
                debug!(
                    "Skipping pinned dirty page {:?} in frame {}",
                    frame.page_number, frame_id
                );
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Flushes every dirty page and closes the device.
    ///
    /// Refused with [`BufferError::PinnedPagesInBuffer`] while any page is
    /// pinned. On failure the pool is handed back inside the error.
    pub fn shutdown(mut self) -> std::result::Result<(), ShutdownError<D>> {
        let pinned = self
            .frames
            .iter()
            .find(|frame| !frame.is_evictable())
            .map(|frame| (frame.page_number, frame.pin_count()));
        if let Some((page_number, pin_count)) = pinned {
            warn!(
                "Refusing to shut down: page {:?} has {} pins",
                page_number, pin_count
            );
            return Err(ShutdownError::new(self, BufferError::PinnedPagesInBuffer));
        }
        if let Err(error) = self.force_flush_pool() {
            return Err(ShutdownError::new(self, error));
        }
        if let Err(error) = self.storage.close() {
            return Err(ShutdownError::new(self, error.into()));
        }
        info!(
            "Shut down buffer pool after {} reads and {} writes",
            self.num_read_io, self.num_write_io
        );
        Ok(())
    }

    fn resident(&self, page_number: PageNumber) -> Result<FrameId> {
        self.page_table
            .get_frame(page_number)
            .ok_or(BufferError::PageNotFound(page_number))
    }

    fn check_handle(&self, handle: &PageHandle) -> Result<FrameId> {
        match self.frames.get(handle.frame_id) {
            Some(frame)
                if frame.page_number == Some(handle.page_number)
                    && frame.holds(handle.lease) =>
            {
                Ok(handle.frame_id)
            }
            _ => Err(BufferError::StaleHandle {
                page_number: handle.page_number,
            }),
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn next_lease(&mut self) -> LeaseId {
        self.next_lease += 1;
        self.next_lease
    }

    fn pin_frame(&mut self, page_number: PageNumber) -> Result<(FrameId, LeaseId)> {
        let page_index = usize::try_from(page_number).map_err(|_| {
            warn!("Refusing to pin negative page number {}", page_number);
            BufferError::InvalidPageNumber(page_number)
        })?;

        if let Some(frame_id) = self.page_table.get_frame(page_number) {
            let tick = self.next_tick();
            let lease = self.next_lease();
            self.frames[frame_id].pin(lease);
            self.replacer.record_hit(frame_id, tick);
            debug!("Page {} hit in frame {}", page_number, frame_id);
            return Ok((frame_id, lease));
        }

        let frame_id = self.choose_victim().ok_or_else(|| {
            warn!("No free buffer for page {}: every frame is pinned", page_number);
            BufferError::NoFreeBuffer
        })?;
        debug!(
            "Page {} missed, evicting {:?} from frame {}",
            page_number, self.frames[frame_id].page_number, frame_id
        );
        self.write_back(frame_id)?;
        self.read_staged(page_index)?;
        let lease = self.next_lease();
        self.install(frame_id, page_number, lease);
        Ok((frame_id, lease))
    }

    fn choose_victim(&mut self) -> Option<FrameId> {
        if let Some(frame_id) = self.frames.iter().position(Frame::is_empty) {
            return Some(frame_id);
        }
        let evictable: Vec<bool> = self.frames.iter().map(Frame::is_evictable).collect();
        let victim = self.replacer.victim(&evictable);
        debug_assert!(victim.map_or(true, |frame_id| evictable[frame_id]));
        victim
    }

    fn write_back(&mut self, frame_id: FrameId) -> Result<()> {
        let frame = &mut self.frames[frame_id];
        let page_number = match frame.page_number {
            Some(page_number) if frame.dirty => page_number,
            _ => return Ok(()),
        };
        self.storage.write_block(page_number as usize, &frame.data)?;
        frame.dirty = false;
        self.num_write_io += 1;
        debug!("Wrote back page {} from frame {}", page_number, frame_id);
        Ok(())
    }

    fn read_staged(&mut self, page_index: usize) -> Result<()> {
        match self.storage.read_block(page_index, &mut self.staging) {
            Ok(()) => {}
            Err(DiskError::ReadNonExistingPage { total_pages, .. }) => {
                debug!(
                    "Growing device from {} to {} pages",
                    total_pages,
                    page_index + 1
                );
                self.storage.ensure_capacity(page_index + 1)?;
                self.storage.read_block(page_index, &mut self.staging)?;
            }
            Err(e) => return Err(e.into()),
        }
        self.num_read_io += 1;
        Ok(())
    }

    fn install(&mut self, frame_id: FrameId, page_number: PageNumber, lease: LeaseId) {
        let tick = self.next_tick();
        let frame = &mut self.frames[frame_id];
        debug_assert!(frame.is_evictable());
        mem::swap(&mut frame.data, &mut self.staging);
        if let Some(evicted) = frame.page_number.replace(page_number) {
            self.page_table.unmap_page(evicted);
        }
        self.page_table.map_to_frame(page_number, frame_id);
        frame.dirty = false;
        frame.pin(lease);
        self.replacer.record_load(frame_id, tick);
    }
}

impl<D: BlockDevice> fmt::Debug for BufferPool<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("page_file", &self.page_file)
            .field("strategy", &self.strategy())
            .field("frames", &self.frame_contents())
            .field("num_read_io", &self.num_read_io)
            .field("num_write_io", &self.num_write_io)
            .finish_non_exhaustive()
    }
}

/// A failed [`BufferPool::shutdown`], carrying the still usable pool.
pub struct ShutdownError<D: BlockDevice = PageFile> {
    pool: BufferPool<D>,
    error: BufferError,
}

impl<D: BlockDevice> ShutdownError<D> {
    fn new(pool: BufferPool<D>, error: BufferError) -> Self {
        Self { pool, error }
    }

    pub fn error(&self) -> &BufferError {
        &self.error
    }

    pub fn into_pool(self) -> BufferPool<D> {
        self.pool
    }

    pub fn into_parts(self) -> (BufferPool<D>, BufferError) {
        (self.pool, self.error)
    }
}

impl<D: BlockDevice> From<ShutdownError<D>> for BufferError {
    fn from(e: ShutdownError<D>) -> Self {
        e.error
    }
}

impl<D: BlockDevice> fmt::Debug for ShutdownError<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<D: BlockDevice> fmt::Display for ShutdownError<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shutdown failed: {}", self.error)
    }
}

impl<D: BlockDevice> Error for ShutdownError<D> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

use disk::{BlockDevice, PageFile};
use log::{info, warn};

use crate::{
    config::BufferPoolConfig,
    error::{BufferError, Result},
    page::{PageGuard, PageHandle},
    pool::BufferPool,
    stats::PoolContent,
    FrameId, PageNumber,
};

/// Slot holding at most one open [`BufferPool`].
///
/// The manager can be initialized, shut down and initialized again. Every
/// page operation on an empty manager fails with
/// [`BufferError::BufferPoolNotInitialized`].
#[derive(Debug)]
pub struct BufferManager<D: BlockDevice = PageFile> {
    pool: Option<BufferPool<D>>,
}

impl<D: BlockDevice> Default for BufferManager<D> {
    fn default() -> Self {
        Self { pool: None }
    }
}

impl BufferManager<PageFile> {
    /// Opens a pool over the configured page file.
    ///
    /// The new file is opened before anything else happens, so a missing file
    /// leaves the current pool untouched. An existing pool is shut down
    /// before being replaced; if that fails it stays installed and the error
    /// is returned.
    pub fn init_buffer_pool(&mut self, config: &BufferPoolConfig) -> Result<()> {
        let pool = BufferPool::init(config)?;
        self.install(pool)
    }
}

impl<D: BlockDevice> BufferManager<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a pool built over an arbitrary device, with the same
    /// replacement rules as [`BufferManager::init_buffer_pool`].
    pub fn install(&mut self, pool: BufferPool<D>) -> Result<()> {
        if let Some(current) = self.pool.take() {
            info!("Replacing open buffer pool");
            if let Err(e) = current.shutdown() {
                warn!("Keeping open buffer pool: {}", e);
                let (current, error) = e.into_parts();
                self.pool = Some(current);
                return Err(error);
            }
        }
        self.pool = Some(pool);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.is_some()
    }

    pub fn shutdown_buffer_pool(&mut self) -> Result<()> {
        let pool = self
            .pool
            .take()
            .ok_or(BufferError::BufferPoolNotInitialized)?;
        pool.shutdown().map_err(|e| {
            let (pool, error) = e.into_parts();
            self.pool = Some(pool);
            error
        })
    }

    pub fn pool(&self) -> Result<&BufferPool<D>> {
        self.pool
            .as_ref()
            .ok_or(BufferError::BufferPoolNotInitialized)
    }

    pub fn pool_mut(&mut self) -> Result<&mut BufferPool<D>> {
        self.pool
            .as_mut()
            .ok_or(BufferError::BufferPoolNotInitialized)
    }

    pub fn pin_page(&mut self, page_number: PageNumber) -> Result<PageHandle> {
        self.pool_mut()?.pin_page(page_number)
    }

    pub fn fetch(&mut self, page_number: PageNumber) -> Result<PageGuard<'_, D>> {
        self.pool_mut()?.fetch(page_number)
    }

    pub fn unpin_page(&mut self, page_number: PageNumber) -> Result<()> {
        self.pool_mut()?.unpin_page(page_number)
    }

    pub fn release(&mut self, handle: PageHandle) -> Result<()> {
        self.pool_mut()?.release(handle)
    }

    pub fn page(&self, handle: &PageHandle) -> Result<&[u8]> {
        self.pool()?.page(handle)
    }

    pub fn page_mut(&mut self, handle: &PageHandle) -> Result<&mut [u8]> {
        self.pool_mut()?.page_mut(handle)
    }

    pub fn mark_dirty(&mut self, page_number: PageNumber) -> Result<()> {
        self.pool_mut()?.mark_dirty(page_number)
    }

    pub fn force_page(&mut self, page_number: PageNumber) -> Result<()> {
        self.pool_mut()?.force_page(page_number)
    }

    pub fn force_flush_pool(&mut self) -> Result<()> {
        self.pool_mut()?.force_flush_pool()
    }

    pub fn find_frame(&self, page_number: PageNumber) -> Result<Option<FrameId>> {
        Ok(self.pool()?.find_frame(page_number))
    }

    pub fn frame_contents(&self) -> Result<Vec<Option<PageNumber>>> {
        Ok(self.pool()?.frame_contents())
    }

    pub fn dirty_flags(&self) -> Result<Vec<bool>> {
        Ok(self.pool()?.dirty_flags())
    }

    pub fn fix_counts(&self) -> Result<Vec<u32>> {
        Ok(self.pool()?.fix_counts())
    }

    pub fn num_read_io(&self) -> Result<usize> {
        Ok(self.pool()?.num_read_io())
    }

    pub fn num_write_io(&self) -> Result<usize> {
        Ok(self.pool()?.num_write_io())
    }

    pub fn pool_content(&self) -> Result<PoolContent> {
        Ok(self.pool()?.pool_content())
    }
}

#[cfg(test)]
mod tests {
    use disk::MemoryDisk;

    use super::*;
    use crate::ReplacementStrategy;

    fn memory_pool(capacity: usize) -> BufferPool<MemoryDisk> {
        BufferPool::with_device(MemoryDisk::new(), capacity, ReplacementStrategy::Fifo).unwrap()
    }

    #[test]
    fn empty_manager_rejects_everything() {
        let mut manager = BufferManager::<MemoryDisk>::new();
        assert!(!manager.is_initialized());
        assert!(matches!(
            manager.shutdown_buffer_pool(),
            Err(BufferError::BufferPoolNotInitialized)
        ));
        assert!(matches!(
            manager.force_flush_pool(),
            Err(BufferError::BufferPoolNotInitialized)
        ));
        assert!(matches!(
            manager.pin_page(1),
            Err(BufferError::BufferPoolNotInitialized)
        ));
        assert!(matches!(
            manager.unpin_page(1),
            Err(BufferError::BufferPoolNotInitialized)
        ));
        assert!(matches!(
            manager.mark_dirty(1),
            Err(BufferError::BufferPoolNotInitialized)
        ));
        assert!(matches!(
            manager.force_page(1),
            Err(BufferError::BufferPoolNotInitialized)
        ));
        assert!(manager.frame_contents().is_err());
        assert!(manager.num_read_io().is_err());
    }

    #[test]
    fn missing_file_keeps_manager_usable() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = BufferManager::new();
        let missing = BufferPoolConfig::new(dir.path().join("unavailable.bin"));
        assert!(matches!(
            manager.init_buffer_pool(&missing),
            Err(BufferError::Disk(disk::DiskError::FileNotFound(_)))
        ));
        assert!(!manager.is_initialized());

        let path = dir.path().join("pool.bin");
        PageFile::create(&path).unwrap();
        manager.init_buffer_pool(&BufferPoolConfig::new(&path)).unwrap();
        let handle = manager.pin_page(0).unwrap();

        // a failed init leaves the open pool alone
        assert!(manager.init_buffer_pool(&missing).is_err());
        assert_eq!(manager.fix_counts().unwrap(), vec![1, 0, 0]);

        manager.release(handle).unwrap();
        manager.shutdown_buffer_pool().unwrap();
        assert!(!manager.is_initialized());
    }

    #[test]
    fn pinned_pool_is_not_replaced() {
        let mut manager = BufferManager::new();
        manager.install(memory_pool(2)).unwrap();
        let handle = manager.pin_page(0).unwrap();

        assert!(matches!(
            manager.install(memory_pool(4)),
            Err(BufferError::PinnedPagesInBuffer)
        ));
        assert_eq!(manager.pool().unwrap().capacity(), 2);
        assert!(matches!(
            manager.shutdown_buffer_pool(),
            Err(BufferError::PinnedPagesInBuffer)
        ));
        assert!(manager.is_initialized());

        manager.release(handle).unwrap();
        manager.install(memory_pool(4)).unwrap();
        assert_eq!(manager.pool().unwrap().capacity(), 4);
    }

    #[test]
    fn forwards_page_operations() {
        let mut manager = BufferManager::new();
        manager.install(memory_pool(3)).unwrap();
        {
            let mut guard = manager.fetch(1).unwrap();
            guard[0] = 1;
        }
        let handle = manager.pin_page(1).unwrap();
        assert_eq!(manager.page(&handle).unwrap()[0], 1);
        manager.page_mut(&handle).unwrap()[1] = 2;
        assert_eq!(manager.find_frame(1).unwrap(), Some(0));
        assert_eq!(manager.pool_content().unwrap().to_string(), "[1x1],[-1 0],[-1 0]");

        manager.release(handle).unwrap();
        manager.force_page(1).unwrap();
        assert_eq!(manager.dirty_flags().unwrap(), vec![false; 3]);
        assert_eq!(manager.num_write_io().unwrap(), 1);
        manager.shutdown_buffer_pool().unwrap();
    }
}

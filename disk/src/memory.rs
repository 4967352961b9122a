use log::debug;

use crate::{check_block_size, BlockDevice, DiskError, Result, PAGE_SIZE};

/// In-memory block device.
///
/// Mirrors [`crate::PageFile`] semantics without touching the file system.
/// Reads or writes of chosen pages can be made to fail, which lets callers
/// exercise their error paths.
#[derive(Debug, Clone)]
pub struct MemoryDisk {
    blocks: Vec<Box<[u8]>>,
    open: bool,
    failing_reads: Vec<usize>,
    failing_writes: Vec<usize>,
}

impl Default for MemoryDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDisk {
    /// A device holding one empty page, like a freshly created page file.
    pub fn new() -> Self {
        Self::with_pages(1)
    }

    pub fn with_pages(pages: usize) -> Self {
        Self {
            blocks: (0..pages).map(|_| empty_block()).collect(),
            open: true,
            failing_reads: Vec::new(),
            failing_writes: Vec::new(),
        }
    }

    pub fn fail_reads_of(&mut self, page_number: usize) {
        self.failing_reads.push(page_number);
    }

    pub fn fail_writes_of(&mut self, page_number: usize) {
        self.failing_writes.push(page_number);
    }

    pub fn clear_failures(&mut self) {
        self.failing_reads.clear();
        self.failing_writes.clear();
    }

    /// Raw contents of a page, bypassing fault injection.
    pub fn block(&self, page_number: usize) -> Option<&[u8]> {
        self.blocks.get(page_number).map(|b| &b[..])
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn check_open(&self) -> Result<()> {
        if !self.open {
            return Err(DiskError::FileHandleNotInitialized);
        }
        Ok(())
    }
}

fn empty_block() -> Box<[u8]> {
    vec![0; PAGE_SIZE].into_boxed_slice()
}

impl BlockDevice for MemoryDisk {
    fn total_pages(&self) -> usize {
        self.blocks.len()
    }

    fn read_block(&mut self, page_number: usize, block: &mut [u8]) -> Result<()> {
        check_block_size(block.len())?;
        self.check_open()?;
        if self.failing_reads.contains(&page_number) {
            return Err(DiskError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("injected read failure on page {}", page_number),
            )));
        }
        let stored = self
            .blocks
            .get(page_number)
            .ok_or(DiskError::ReadNonExistingPage {
                page_number,
                total_pages: self.blocks.len(),
            })?;
        block.copy_from_slice(stored);
        Ok(())
    }

    fn write_block(&mut self, page_number: usize, block: &[u8]) -> Result<()> {
        check_block_size(block.len())?;
        self.check_open()?;
        if self.failing_writes.contains(&page_number) {
            return Err(DiskError::WriteFailed { page_number });
        }
        let stored = self
            .blocks
            .get_mut(page_number)
            .ok_or(DiskError::WriteFailed { page_number })?;
        stored.copy_from_slice(block);
        Ok(())
    }

    fn ensure_capacity(&mut self, pages: usize) -> Result<()> {
        self.check_open()?;
        while self.blocks.len() < pages {
            self.blocks.push(empty_block());
        }
        debug!("Memory disk holds {} pages", self.blocks.len());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.check_open()?;
        self.open = false;
        Ok(())
    }
}

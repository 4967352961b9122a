use std::{
    fs::{remove_file, File},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};
use thiserror::Error;

mod memory;

pub use memory::MemoryDisk;

/// Size in bytes of every block in a page file.
pub const PAGE_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum DiskError {
    #[error("page file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("file handle is not initialized")]
    FileHandleNotInitialized,
    #[error("write to page {page_number} failed")]
    WriteFailed { page_number: usize },
    #[error("page {page_number} does not exist (file holds {total_pages} pages)")]
    ReadNonExistingPage {
        page_number: usize,
        total_pages: usize,
    },
    #[error("block buffer has {actual} bytes, expected {expected}")]
    IncorrectBlockSize { expected: usize, actual: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DiskError>;

/// Block-addressed storage of fixed-size pages.
///
/// Pages are 0-indexed and always [`PAGE_SIZE`] bytes long. Implementations
/// never retry or grow on their own; callers decide when to call
/// [`BlockDevice::ensure_capacity`].
pub trait BlockDevice {
    fn total_pages(&self) -> usize;

    fn read_block(&mut self, page_number: usize, block: &mut [u8]) -> Result<()>;

    fn write_block(&mut self, page_number: usize, block: &[u8]) -> Result<()>;

    /// Appends zero-filled pages until the device holds at least `pages`.
    fn ensure_capacity(&mut self, pages: usize) -> Result<()>;

    /// Flushes and releases the underlying handle.
    fn close(&mut self) -> Result<()>;
}

pub(crate) fn check_block_size(len: usize) -> Result<()> {
    if len != PAGE_SIZE {
        return Err(DiskError::IncorrectBlockSize {
            expected: PAGE_SIZE,
            actual: len,
        });
    }
    Ok(())
}

fn page_offset(page_number: usize) -> u64 {
    (page_number * PAGE_SIZE) as u64
}

fn write_empty_block(file: &mut File) -> io::Result<()> {
    file.seek(SeekFrom::End(0))?;
    file.write_all(&[0; PAGE_SIZE])?;
    Ok(())
}

/// A file of fixed-size pages.
///
/// The file length is always a multiple of [`PAGE_SIZE`]; a freshly created
/// file holds exactly one zero-filled page.
#[derive(Debug)]
pub struct PageFile {
    path: PathBuf,
    file: Option<File>,
    total_pages: usize,
    cur_page_pos: usize,
}

impl PageFile {
    /// Creates (or truncates) a page file holding one empty page.
    pub fn create(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::options()
            .truncate(true)
            .write(true)
            .read(true)
            .create(true)
            .open(path)?;
        write_empty_block(&mut file)?;
        file.sync_all()?;
        info!("Created page file {}", path.display());
        Ok(())
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::options().write(true).read(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DiskError::FileNotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        let total_pages = file.metadata()?.len() as usize / PAGE_SIZE;
        info!(
            "Opened page file {} with {} pages",
            path.display(),
            total_pages
        );
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            total_pages,
            cur_page_pos: 0,
        })
    }

    pub fn destroy(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match remove_file(path) {
            Ok(()) => {
                info!("Destroyed page file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DiskError::FileNotFound(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Page position of the most recent read or write.
    pub fn block_pos(&self) -> usize {
        self.cur_page_pos
    }

    fn handle(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(DiskError::FileHandleNotInitialized)
    }

    pub fn append_empty_block(&mut self) -> Result<()> {
        let file = self.handle()?;
        write_empty_block(file)?;
        self.total_pages += 1;
        debug!("Appended page {} to {}", self.total_pages - 1, self.path.display());
        Ok(())
    }

    pub fn read_first_block(&mut self, block: &mut [u8]) -> Result<()> {
        self.read_block(0, block)
    }

    pub fn read_previous_block(&mut self, block: &mut [u8]) -> Result<()> {
        if self.cur_page_pos == 0 {
            return Err(DiskError::ReadNonExistingPage {
                page_number: 0,
                total_pages: self.total_pages,
            });
        }
        self.read_block(self.cur_page_pos - 1, block)
    }

    pub fn read_current_block(&mut self, block: &mut [u8]) -> Result<()> {
        self.read_block(self.cur_page_pos, block)
    }

    pub fn read_next_block(&mut self, block: &mut [u8]) -> Result<()> {
        self.read_block(self.cur_page_pos + 1, block)
    }

    pub fn read_last_block(&mut self, block: &mut [u8]) -> Result<()> {
        if self.total_pages == 0 {
            return Err(DiskError::ReadNonExistingPage {
                page_number: 0,
                total_pages: 0,
            });
        }
        self.read_block(self.total_pages - 1, block)
    }

    pub fn write_current_block(&mut self, block: &[u8]) -> Result<()> {
        self.write_block(self.cur_page_pos, block)
    }
}

impl BlockDevice for PageFile {
    fn total_pages(&self) -> usize {
        self.total_pages
    }

    fn read_block(&mut self, page_number: usize, block: &mut [u8]) -> Result<()> {
        check_block_size(block.len())?;
        let total_pages = self.total_pages;
        let file = self.handle()?;
        if page_number >= total_pages {
            return Err(DiskError::ReadNonExistingPage {
                page_number,
                total_pages,
            });
        }
        info!("Start reading block[{}]", page_number);
        file.seek(SeekFrom::Start(page_offset(page_number)))?;
        file.read_exact(block)?;
        self.cur_page_pos = page_number;
        info!("Done reading block[{}]", page_number);
        Ok(())
    }

    fn write_block(&mut self, page_number: usize, block: &[u8]) -> Result<()> {
        check_block_size(block.len())?;
        let total_pages = self.total_pages;
        let file = self.handle()?;
        if page_number >= total_pages {
            return Err(DiskError::WriteFailed { page_number });
        }
        info!("Start writing block[{}]", page_number);
        file.seek(SeekFrom::Start(page_offset(page_number)))?;
        file.write_all(block)?;
        self.cur_page_pos = page_number;
        info!("Done writing block[{}]", page_number);
        Ok(())
    }

    fn ensure_capacity(&mut self, pages: usize) -> Result<()> {
        if self.total_pages < pages {
            debug!(
                "Growing {} from {} to {} pages",
                self.path.display(),
                self.total_pages,
                pages
            );
        }
        while self.total_pages < pages {
            self.append_empty_block()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let file = self.file.take().ok_or(DiskError::FileHandleNotInitialized)?;
        file.sync_all()?;
        info!("Closed page file {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn scratch(name: &str) -> (TempDir, PathBuf) {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempdir().unwrap();
        let path = dir.path().join(name);
        (dir, path)
    }

    #[test]
    fn test_create() {
        let (_dir, path) = scratch("test_create.bin");
        PageFile::create(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), PAGE_SIZE as u64);
        let mut file = PageFile::open(&path).unwrap();
        assert_eq!(file.total_pages(), 1);
        let mut block = vec![1; PAGE_SIZE];
        file.read_first_block(&mut block).unwrap();
        assert!(block.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_open_missing() {
        let (_dir, path) = scratch("missing.bin");
        assert!(matches!(
            PageFile::open(&path),
            Err(DiskError::FileNotFound(p)) if p == path
        ));
        assert!(matches!(
            PageFile::destroy(&path),
            Err(DiskError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_read_write() {
        let (_dir, path) = scratch("test_read_write.bin");
        PageFile::create(&path).unwrap();
        let mut file = PageFile::open(&path).unwrap();
        let mut block = vec![0; PAGE_SIZE];
        block[0] = 1;
        block[PAGE_SIZE - 1] = 2;
        file.write_block(0, &block).unwrap();
        file.close().unwrap();

        let mut file = PageFile::open(&path).unwrap();
        let mut read = vec![0; PAGE_SIZE];
        file.read_block(0, &mut read).unwrap();
        assert_eq!(read, block);
    }

    #[test]
    fn test_read_write_over_capacity() {
        let (_dir, path) = scratch("test_over_capacity.bin");
        PageFile::create(&path).unwrap();
        let mut file = PageFile::open(&path).unwrap();
        let mut block = vec![0; PAGE_SIZE];
        assert!(matches!(
            file.write_block(1, &block),
            Err(DiskError::WriteFailed { page_number: 1 })
        ));
        assert!(matches!(
            file.read_block(1, &mut block),
            Err(DiskError::ReadNonExistingPage {
                page_number: 1,
                total_pages: 1
            })
        ));
    }

    #[test]
    fn test_incorrect_block_size() {
        let (_dir, path) = scratch("test_block_size.bin");
        PageFile::create(&path).unwrap();
        let mut file = PageFile::open(&path).unwrap();
        let block = vec![0; 256];
        assert!(matches!(
            file.write_block(0, &block),
            Err(DiskError::IncorrectBlockSize {
                expected: PAGE_SIZE,
                actual: 256
            })
        ));
    }

    #[test]
    fn test_ensure_capacity() {
        let (_dir, path) = scratch("test_capacity.bin");
        PageFile::create(&path).unwrap();
        let mut file = PageFile::open(&path).unwrap();
        file.ensure_capacity(4).unwrap();
        assert_eq!(file.total_pages(), 4);
        file.ensure_capacity(2).unwrap();
        assert_eq!(file.total_pages(), 4);
        file.close().unwrap();
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            4 * PAGE_SIZE as u64
        );
    }

    #[test]
    fn test_relative_reads() {
        let (_dir, path) = scratch("test_relative.bin");
        PageFile::create(&path).unwrap();
        let mut file = PageFile::open(&path).unwrap();
        file.ensure_capacity(3).unwrap();
        for page in 0..3 {
            file.write_block(page, &vec![page as u8 + 1; PAGE_SIZE])
                .unwrap();
        }

        let mut block = vec![0; PAGE_SIZE];
        file.read_first_block(&mut block).unwrap();
        assert_eq!(block[0], 1);
        assert!(file.read_previous_block(&mut block).is_err());
        file.read_next_block(&mut block).unwrap();
        assert_eq!((file.block_pos(), block[0]), (1, 2));
        file.read_current_block(&mut block).unwrap();
        assert_eq!(block[0], 2);
        file.read_last_block(&mut block).unwrap();
        assert_eq!((file.block_pos(), block[0]), (2, 3));
        assert!(file.read_next_block(&mut block).is_err());
        file.read_previous_block(&mut block).unwrap();
        assert_eq!(block[0], 2);

        file.write_current_block(&vec![9; PAGE_SIZE]).unwrap();
        file.read_block(1, &mut block).unwrap();
        assert_eq!(block[0], 9);
    }

    #[test]
    fn test_closed_handle() {
        let (_dir, path) = scratch("test_closed.bin");
        PageFile::create(&path).unwrap();
        let mut file = PageFile::open(&path).unwrap();
        file.close().unwrap();
        let mut block = vec![0; PAGE_SIZE];
        assert!(matches!(
            file.read_block(0, &mut block),
            Err(DiskError::FileHandleNotInitialized)
        ));
        assert!(matches!(
            file.append_empty_block(),
            Err(DiskError::FileHandleNotInitialized)
        ));
        assert!(matches!(
            file.close(),
            Err(DiskError::FileHandleNotInitialized)
        ));
    }

    #[test]
    fn test_destroy() {
        let (_dir, path) = scratch("test_destroy.bin");
        PageFile::create(&path).unwrap();
        PageFile::destroy(&path).unwrap();
        assert!(!path.exists());
    }
}

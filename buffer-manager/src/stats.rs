use std::fmt;

use disk::BlockDevice;

use crate::{
    config::ReplacementStrategy, error::Result, page::PageHandle, pool::BufferPool, PageNumber,
    NO_PAGE,
};

impl<D: BlockDevice> BufferPool<D> {
    /// Page held by each frame, in frame order.
    pub fn frame_contents(&self) -> Vec<Option<PageNumber>> {
        self.frames.iter().map(|frame| frame.page_number).collect()
    }

    pub fn dirty_flags(&self) -> Vec<bool> {
        self.frames.iter().map(|frame| frame.dirty).collect()
    }

    pub fn fix_counts(&self) -> Vec<u32> {
        self.frames.iter().map(|frame| frame.pin_count()).collect()
    }

    /// Pages read from the device since the pool was opened.
    pub fn num_read_io(&self) -> usize {
        self.num_read_io
    }

    /// Pages written to the device since the pool was opened.
    pub fn num_write_io(&self) -> usize {
        self.num_write_io
    }

    pub fn pool_content(&self) -> PoolContent {
        PoolContent {
            strategy: self.strategy(),
            frames: self
                .frames
                .iter()
                .map(|frame| FrameState {
                    page_number: frame.page_number,
                    dirty: frame.dirty,
                    fix_count: frame.pin_count(),
                })
                .collect(),
        }
    }

    pub fn page_content(&self, handle: &PageHandle) -> Result<PageContent<'_>> {
        Ok(PageContent {
            page_number: handle.page_number(),
            data: self.page(handle)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameState {
    page_number: Option<PageNumber>,
    dirty: bool,
    fix_count: u32,
}

/// Snapshot of every frame of a pool.
///
/// Displays as `[3 0],[4x1],[-1 0]`: page number, `x` when dirty, fix count.
/// The alternate form (`{:#}`) prefixes the strategy and capacity, as in
/// `{FIFO 3}: [3 0],[4x1],[-1 0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolContent {
    strategy: ReplacementStrategy,
    frames: Vec<FrameState>,
}

impl fmt::Display for PoolContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(
                f,
                "{{{} {}}}: ",
                self.strategy.to_string().to_uppercase(),
                self.frames.len()
            )?;
        }
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(
                f,
                "[{}{}{}]",
                frame.page_number.unwrap_or(NO_PAGE),
                if frame.dirty { "x" } else { " " },
                frame.fix_count
            )?;
        }
        Ok(())
    }
}

/// Hex dump of a pinned page.
pub struct PageContent<'a> {
    page_number: PageNumber,
    data: &'a [u8],
}

impl<'a> fmt::Display for PageContent<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Page {}]", self.page_number)?;
        for (i, byte) in self.data.iter().enumerate() {
            write!(f, "{:02X}", byte)?;
            if (i + 1) % 8 == 0 {
                f.write_str(" ")?;
            }
            if (i + 1) % 64 == 0 {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}

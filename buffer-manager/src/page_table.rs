use std::collections::HashMap;

use crate::{FrameId, PageNumber};

/// Maps each resident page to the frame holding it.
///
/// A page number appears at most once, so a page can never be resident in
/// two frames at the same time.
#[derive(Debug, Default)]
pub(crate) struct PageTable {
    entries: HashMap<PageNumber, FrameId>,
}

impl PageTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn get_frame(&self, page_number: PageNumber) -> Option<FrameId> {
        self.entries.get(&page_number).copied()
    }

    pub(crate) fn map_to_frame(&mut self, page_number: PageNumber, frame_id: FrameId) {
        let previous = self.entries.insert(page_number, frame_id);
        debug_assert!(
            previous.is_none(),
            "page {} mapped twice (frames {:?} and {})",
            page_number,
            previous,
            frame_id
        );
    }

    pub(crate) fn unmap_page(&mut self, page_number: PageNumber) -> Option<FrameId> {
        self.entries.remove(&page_number)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

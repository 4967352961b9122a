use super::Replacer;
use crate::{FrameId, ReplacementStrategy};

/// Second-chance replacement.
///
/// Every pin sets the frame's use bit. The hand sweeps from its last
/// position, clearing bits as it passes, and stops at the first unpinned
/// frame whose bit is already clear.
#[derive(Debug)]
pub struct ClockReplacer {
    used: Vec<bool>,
    hand: usize,
}

impl ClockReplacer {
    pub fn new(capacity: usize) -> Self {
        Self {
            used: vec![false; capacity],
            hand: 0,
        }
    }

    pub fn hand(&self) -> usize {
        self.hand
    }

    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.used.len();
    }
}

impl Replacer for ClockReplacer {
    fn strategy(&self) -> ReplacementStrategy {
        ReplacementStrategy::Clock
    }

    fn record_load(&mut self, frame_id: FrameId, _tick: u64) {
        self.used[frame_id] = true;
    }

    fn record_hit(&mut self, frame_id: FrameId, _tick: u64) {
        self.used[frame_id] = true;
    }

    fn victim(&mut self, evictable: &[bool]) -> Option<FrameId> {
        let capacity = self.used.len();
        if capacity == 0 {
            return None;
        }
        let mut seen_unpinned = false;
        // Two rounds always suffice: the first clears every bit it meets.
        for step in 0..2 * capacity {
            if step == capacity && !seen_unpinned {
                return None;
            }
            let frame_id = self.hand;
            if evictable[frame_id] {
                seen_unpinned = true;
                if !self.used[frame_id] {
                    self.advance();
                    return Some(frame_id);
                }
            }
            self.used[frame_id] = false;
            self.advance();
        }
        None
    }
}

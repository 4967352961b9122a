use std::collections::VecDeque;

use super::{min_evictable_by, Replacer};
use crate::{FrameId, ReplacementStrategy};

/// LRU-K: ranks frames by the time of their K-th most recent access.
///
/// A frame with fewer than K recorded accesses has an infinite backward
/// K-distance and is evicted before any frame with a full history. Among
/// those, and among frames with equal K-th access, the older last access
/// loses.
#[derive(Debug)]
pub struct LruKReplacer {
    k: usize,
    history: Vec<VecDeque<u64>>,
}

impl LruKReplacer {
    pub fn new(capacity: usize, k: usize) -> Self {
        let k = k.max(1);
        Self {
            k,
            history: (0..capacity).map(|_| VecDeque::with_capacity(k)).collect(),
        }
    }

    fn record(&mut self, frame_id: FrameId, tick: u64) {
        let history = &mut self.history[frame_id];
        if history.len() == self.k {
            history.pop_front();
        }
        history.push_back(tick);
    }

    fn rank(&self, frame_id: FrameId) -> (Option<u64>, u64) {
        let history = &self.history[frame_id];
        let kth = if history.len() == self.k {
            history.front().copied()
        } else {
            None
        };
        (kth, history.back().copied().unwrap_or(0))
    }
}

impl Replacer for LruKReplacer {
    fn strategy(&self) -> ReplacementStrategy {
        ReplacementStrategy::LruK(self.k)
    }

    fn record_load(&mut self, frame_id: FrameId, tick: u64) {
        self.history[frame_id].clear();
        self.record(frame_id, tick);
    }

    fn record_hit(&mut self, frame_id: FrameId, tick: u64) {
        self.record(frame_id, tick);
    }

    fn victim(&mut self, evictable: &[bool]) -> Option<FrameId> {
        min_evictable_by(evictable, |frame_id| self.rank(frame_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_history_goes_first() {
        let mut replacer = LruKReplacer::new(3, 2);
        replacer.record_load(0, 1);
        replacer.record_hit(0, 2);
        replacer.record_load(1, 3);
        replacer.record_hit(1, 4);
        replacer.record_load(2, 5);
        // frame 2 was touched last but only once
        assert_eq!(replacer.victim(&[true; 3]), Some(2));
        assert_eq!(replacer.victim(&[true, true, false]), Some(0));
    }

    #[test]
    fn kth_access_decides_between_full_histories() {
        let mut replacer = LruKReplacer::new(2, 2);
        replacer.record_load(0, 1);
        replacer.record_load(1, 2);
        replacer.record_hit(1, 3);
        replacer.record_hit(0, 4);
        // second most recent: frame 0 -> 1, frame 1 -> 2
        assert_eq!(replacer.victim(&[true; 2]), Some(0));
        replacer.record_hit(0, 5);
        assert_eq!(replacer.victim(&[true; 2]), Some(1));
    }

    #[test]
    fn reload_forgets_previous_page() {
        let mut replacer = LruKReplacer::new(2, 2);
        replacer.record_load(0, 1);
        replacer.record_hit(0, 2);
        replacer.record_load(1, 3);
        replacer.record_hit(1, 4);
        replacer.record_load(0, 5);
        assert_eq!(replacer.victim(&[true; 2]), Some(0));
    }

    #[test]
    fn equal_short_histories_fall_back_to_last_access() {
        let mut replacer = LruKReplacer::new(3, 3);
        replacer.record_load(0, 1);
        replacer.record_load(1, 2);
        replacer.record_hit(0, 3);
        replacer.record_load(2, 4);
        assert_eq!(replacer.victim(&[true; 3]), Some(1));
    }
}

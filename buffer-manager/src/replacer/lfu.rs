use super::{min_evictable_by, Replacer};
use crate::{FrameId, ReplacementStrategy};

/// Evicts the frame whose current page has been pinned the fewest times.
/// Counts restart when a new page is loaded.
#[derive(Debug)]
pub struct LfuReplacer {
    accesses: Vec<u64>,
}

impl LfuReplacer {
    pub fn new(capacity: usize) -> Self {
        Self {
            accesses: vec![0; capacity],
        }
    }
}

impl Replacer for LfuReplacer {
    fn strategy(&self) -> ReplacementStrategy {
        ReplacementStrategy::Lfu
    }

    fn record_load(&mut self, frame_id: FrameId, _tick: u64) {
        self.accesses[frame_id] = 1;
    }

    fn record_hit(&mut self, frame_id: FrameId, _tick: u64) {
        self.accesses[frame_id] += 1;
    }

    fn victim(&mut self, evictable: &[bool]) -> Option<FrameId> {
        min_evictable_by(evictable, |frame_id| self.accesses[frame_id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_used_then_lowest_index() {
        let mut replacer = LfuReplacer::new(3);
        replacer.record_load(0, 1);
        replacer.record_load(1, 2);
        replacer.record_load(2, 3);
        replacer.record_hit(0, 4);
        assert_eq!(replacer.victim(&[true; 3]), Some(1));
        replacer.record_hit(1, 5);
        assert_eq!(replacer.victim(&[true; 3]), Some(2));
        replacer.record_hit(2, 6);
        assert_eq!(replacer.victim(&[true; 3]), Some(0));

        replacer.record_load(0, 7);
        assert_eq!(replacer.victim(&[true; 3]), Some(0));
    }
}

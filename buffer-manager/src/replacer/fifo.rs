use super::{min_evictable_by, Replacer};
use crate::{FrameId, ReplacementStrategy};

/// Evicts the page that was loaded first. Hits do not refresh the load time.
#[derive(Debug)]
pub struct FifoReplacer {
    load_time: Vec<u64>,
}

impl FifoReplacer {
    pub fn new(capacity: usize) -> Self {
        Self {
            load_time: vec![0; capacity],
        }
    }
}

impl Replacer for FifoReplacer {
    fn strategy(&self) -> ReplacementStrategy {
        ReplacementStrategy::Fifo
    }

    fn record_load(&mut self, frame_id: FrameId, tick: u64) {
        self.load_time[frame_id] = tick;
    }

    fn record_hit(&mut self, _frame_id: FrameId, _tick: u64) {}

    fn victim(&mut self, evictable: &[bool]) -> Option<FrameId> {
        min_evictable_by(evictable, |frame_id| self.load_time[frame_id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_in_load_order() {
        let mut replacer = FifoReplacer::new(3);
        replacer.record_load(0, 1);
        replacer.record_load(1, 2);
        replacer.record_load(2, 3);
        replacer.record_hit(0, 4);
        assert_eq!(replacer.victim(&[true; 3]), Some(0));

        replacer.record_load(0, 5);
        assert_eq!(replacer.victim(&[true; 3]), Some(1));
        assert_eq!(replacer.victim(&[true, false, true]), Some(2));
    }
}

use super::{min_evictable_by, Replacer};
use crate::{FrameId, ReplacementStrategy};

#[derive(Debug)]
pub struct LruReplacer {
    last_access: Vec<u64>,
}

impl LruReplacer {
    pub fn new(capacity: usize) -> Self {
        Self {
            last_access: vec![0; capacity],
        }
    }
}

impl Replacer for LruReplacer {
    fn strategy(&self) -> ReplacementStrategy {
        ReplacementStrategy::Lru
    }

    fn record_load(&mut self, frame_id: FrameId, tick: u64) {
        self.last_access[frame_id] = tick;
    }

    fn record_hit(&mut self, frame_id: FrameId, tick: u64) {
        self.last_access[frame_id] = tick;
    }

    fn victim(&mut self, evictable: &[bool]) -> Option<FrameId> {
        min_evictable_by(evictable, |frame_id| self.last_access[frame_id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_refresh_recency() {
        let mut replacer = LruReplacer::new(3);
        replacer.record_load(0, 1);
        replacer.record_load(1, 2);
        replacer.record_load(2, 3);
        replacer.record_hit(0, 4);
        assert_eq!(replacer.victim(&[true; 3]), Some(1));
        replacer.record_hit(1, 5);
        assert_eq!(replacer.victim(&[true; 3]), Some(2));
        assert_eq!(replacer.victim(&[true, true, false]), Some(0));
        assert_eq!(replacer.victim(&[false; 3]), None);
    }
}

//! Victim selection.
//!
//! A [`Replacer`] keeps per-frame access metadata for one strategy and picks a
//! victim among the frames the pool reports as evictable. The pool itself
//! prefers empty frames and only asks the replacer once every frame is
//! occupied.
//!
//! Timestamps are the pool's access counter, which strictly increases across
//! all pins, so two accesses never share a tick.

mod clock;
mod fifo;
mod lfu;
mod lru;
mod lru_k;

pub use clock::ClockReplacer;
pub use fifo::FifoReplacer;
pub use lfu::LfuReplacer;
pub use lru::LruReplacer;
pub use lru_k::LruKReplacer;

use crate::{FrameId, ReplacementStrategy};

pub trait Replacer: std::fmt::Debug {
    fn strategy(&self) -> ReplacementStrategy;

    /// A new page was installed into `frame_id` at `tick`. Any metadata left
    /// by the previous occupant is discarded.
    fn record_load(&mut self, frame_id: FrameId, tick: u64);

    /// The page already resident in `frame_id` was pinned again at `tick`.
    fn record_hit(&mut self, frame_id: FrameId, tick: u64);

    /// Chooses a frame to evict. `evictable[i]` is true when frame `i` has no
    /// pins; a frame that is not evictable is never returned.
    fn victim(&mut self, evictable: &[bool]) -> Option<FrameId>;
}

pub(crate) fn build(strategy: ReplacementStrategy, capacity: usize) -> Box<dyn Replacer> {
    match strategy {
        ReplacementStrategy::Fifo => Box::new(FifoReplacer::new(capacity)),
        ReplacementStrategy::Lru => Box::new(LruReplacer::new(capacity)),
        ReplacementStrategy::LruK(k) => Box::new(LruKReplacer::new(capacity, k)),
        ReplacementStrategy::Clock => Box::new(ClockReplacer::new(capacity)),
        ReplacementStrategy::Lfu => Box::new(LfuReplacer::new(capacity)),
    }
}

/// Evictable frame with the smallest key; ties go to the lowest frame index.
fn min_evictable_by<K, F>(evictable: &[bool], key: F) -> Option<FrameId>
where
    K: Ord,
    F: Fn(FrameId) -> K,
{
    evictable
        .iter()
        .enumerate()
        .filter(|&(_, &evictable)| evictable)
        .map(|(frame_id, _)| frame_id)
        .min_by_key(|&frame_id| (key(frame_id), frame_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_matches_strategy() {
        for strategy in [
            ReplacementStrategy::Fifo,
            ReplacementStrategy::Lru,
            ReplacementStrategy::LruK(3),
            ReplacementStrategy::Clock,
            ReplacementStrategy::Lfu,
        ] {
            assert_eq!(build(strategy, 4).strategy(), strategy);
        }
    }

    #[test]
    fn min_evictable_skips_pinned_and_breaks_ties_low() {
        let keys = [1, 0, 0, 0];
        let evictable = [true, false, true, true];
        assert_eq!(min_evictable_by(&evictable, |i| keys[i]), Some(2));
        assert_eq!(min_evictable_by(&[false, false], |i| i), None);
    }
}

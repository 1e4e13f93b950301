//! Pluggable "which pending task next" policies.
//!
//! The broker hands a selector the pending tasks already sorted by priority
//! (oldest first, then lowest ID), so every policy sees the same input order
//! regardless of the underlying map's iteration order.

use fleet_core::SimRng;

use crate::Task;

/// Chooses the next task to offer from the pending pool.
///
/// `select` must return an index into `candidates` or `None` when it is empty.
/// It is called under the broker lock in the shared broker, so keep it cheap.
pub trait TaskSelector: Send + 'static {
    fn select(&mut self, candidates: &[&Task]) -> Option<usize>;
}

/// Deterministic FIFO by origination time.  The default policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct OldestFirst;

impl TaskSelector for OldestFirst {
    #[inline]
    fn select(&mut self, candidates: &[&Task]) -> Option<usize> {
        if candidates.is_empty() { None } else { Some(0) }
    }
}

/// Uniformly random pick, reproducible from the seed.
///
/// Spreads robots over the pool instead of having all of them race for the
/// oldest task.
#[derive(Debug, Clone)]
pub struct RandomPick {
    rng: SimRng,
}

impl RandomPick {
    pub fn new(rng: SimRng) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SimRng::new(seed))
    }
}

impl TaskSelector for RandomPick {
    fn select(&mut self, candidates: &[&Task]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        Some(self.rng.gen_range(0..candidates.len()))
    }
}

//! Run-scoped entity ids
//!
//! The server under test is shared and stateful. Handing every created pet
//! and order a fresh id keeps cases independent of each other and of earlier
//! runs. `Literal` mode reproduces the fixed ids instead.

use std::sync::atomic::{AtomicI64, Ordering};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use petcheck_core::IdStrategy;

/// Lowest id handed out in run-scoped mode; keeps clear of small literal
/// ids and of the "missing" ids (9999).
pub const RUN_SCOPED_FLOOR: i64 = 1_000_000;

/// Highest run base; leaves room for the per-run counter.
const RUN_SCOPED_CEILING: i64 = 1_000_000_000_000;

pub struct IdAllocator {
    strategy: IdStrategy,
    base: i64,
    next: AtomicI64,
}

impl IdAllocator {
    /// Create an allocator; `seed` pins the run base for reproducible runs.
    #[must_use]
    pub fn new(strategy: IdStrategy, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_entropy(),
        };
        Self {
            strategy,
            base: rng.gen_range(RUN_SCOPED_FLOOR..RUN_SCOPED_CEILING),
            next: AtomicI64::new(0),
        }
    }

    /// Id for a new entity; `literal` is used as-is in literal mode.
    pub fn next_id(&self, literal: i64) -> i64 {
        match self.strategy {
            IdStrategy::Literal => literal,
            IdStrategy::RunScoped => self.base + self.next.fetch_add(1, Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn literal_mode_returns_literals() {
        let ids = IdAllocator::new(IdStrategy::Literal, None);
        assert_eq!(ids.next_id(1), 1);
        assert_eq!(ids.next_id(1), 1);
        assert_eq!(ids.next_id(10), 10);
    }

    #[test]
    fn run_scoped_ids_are_sequential_from_base() {
        let ids = IdAllocator::new(IdStrategy::RunScoped, Some(7));
        let first = ids.next_id(1);
        assert!(first >= RUN_SCOPED_FLOOR);
        assert_eq!(ids.next_id(10), first + 1);
        assert_eq!(ids.next_id(1), first + 2);
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = IdAllocator::new(IdStrategy::RunScoped, Some(42));
        let b = IdAllocator::new(IdStrategy::RunScoped, Some(42));
        assert_eq!(a.next_id(1), b.next_id(1));
    }

    proptest! {
        #[test]
        fn run_scoped_ids_unique_and_never_missing(seed in any::<u64>(), n in 1usize..200) {
            let ids = IdAllocator::new(IdStrategy::RunScoped, Some(seed));
            let mut seen = HashSet::new();
            for _ in 0..n {
                let id = ids.next_id(1);
                prop_assert!(id >= RUN_SCOPED_FLOOR);
                prop_assert!(id != 9999);
                prop_assert!(seen.insert(id));
            }
        }
    }
}

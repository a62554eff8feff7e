//! Shard tracker: a single-pass, single-owner cursor over a `Plan`
//! (`spec.md` §4.5). Used by the compaction writer to decide when to roll a
//! new output file.

use crate::plan::Plan;
use crate::token::RingToken;
use std::sync::Arc;

/// Stateful cursor over a shared, immutable `Plan`.
///
/// Not `Sync`: a tracker is single-owner, single-thread, and lives only for
/// the duration of one compaction write (`spec.md` §5). Multiple trackers
/// may share the same `Plan` concurrently; each owns only its own index.
pub struct ShardTracker<T: RingToken> {
    plan: Arc<Plan<T>>,
    current: usize,
    last_seen: Option<T>,
}

impl<T: RingToken> ShardTracker<T> {
    pub(crate) fn new(plan: Arc<Plan<T>>) -> Self {
        Self {
            plan,
            current: 0,
            last_seen: None,
        }
    }

    /// `true` once every shard has been passed.
    pub fn is_terminated(&self) -> bool {
        self.current >= self.plan.len()
    }

    pub fn shard_index(&self) -> usize {
        self.current
    }

    /// The current shard's start token, or `None` once terminated.
    pub fn shard_start(&self) -> Option<T> {
        self.plan.shards().get(self.current).map(|s| s.start)
    }

    /// The current shard's end token, or `None` for the terminal shard
    /// (including when already terminated).
    pub fn shard_end(&self) -> Option<T> {
        self.plan.shards().get(self.current).and_then(|s| s.end)
    }

    /// Advances the cursor to `t`. `t` must be greater than or equal to the
    /// last token passed to this method (a caller contract, not enforced
    /// here beyond a debug assertion) — the tracker does at most one
    /// comparison per shard it steps past.
    ///
    /// Returns `true` iff this call crossed into a new shard. A `t` equal
    /// to the current shard's `end` stays put (the end is exclusive on
    /// entry, inclusive on exit — callers step past it with
    /// `RingToken::next_valid`). A `t` past several shard ends steps
    /// through all of them, returning `true` if at least one step occurred.
    pub fn advance_to(&mut self, t: T) -> bool {
        debug_assert!(
            self.last_seen.map_or(true, |last| t >= last),
            "advance_to called with a token that regresses ring order"
        );
        self.last_seen = Some(t);

        let mut crossed = false;
        while !self.is_terminated() {
            match self.plan.shards()[self.current].end {
                Some(end) => {
                    if t <= end {
                        return crossed;
                    }
                    self.current += 1;
                    crossed = true;
                }
                None => return crossed,
            }
        }
        crossed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::DiskBoundarySnapshot;
    use crate::facade::Facade;
    use crate::owned::OwnedRangeSet;
    use crate::token::Murmur3RingToken as M;

    fn tok(p: f64) -> M {
        M::split(M::minimum(), M::minimum(), p)
    }

    #[test]
    fn shard_count_matches_d_times_s() {
        for d in 1..=3usize {
            for s in 1..=3usize {
                let owned = OwnedRangeSet::<M>::full(1.0).unwrap();
                let mut positions: Vec<M> = (1..d).map(|i| tok(i as f64 / d as f64)).collect();
                positions.push(tok(1.0));
                let snapshot = DiskBoundarySnapshot::new(owned, positions).unwrap();
                let facade = Facade::new(snapshot);
                let mut tracker = facade.boundaries(s).unwrap();

                let mut shard_count = 1;
                let mut t = tracker.shard_start().unwrap();
                loop {
                    if let Some(end) = tracker.shard_end() {
                        t = M::next_valid(end);
                        let crossed = tracker.advance_to(t);
                        if tracker.is_terminated() {
                            break;
                        }
                        assert!(crossed);
                        shard_count += 1;
                    } else {
                        break;
                    }
                }
                assert_eq!(shard_count, d * s, "d={d} s={s}");
            }
        }
    }

    #[test]
    fn advance_to_shard_end_does_not_cross() {
        let owned = OwnedRangeSet::<M>::full(1.0).unwrap();
        let snapshot = DiskBoundarySnapshot::single_slice(owned);
        let facade = Facade::new(snapshot);
        let mut tracker = facade.boundaries(2).unwrap();
        let end = tracker.shard_end().unwrap();
        assert!(!tracker.advance_to(end));
        assert!(tracker.advance_to(M::next_valid(end)));
    }

    #[test]
    fn empty_owned_set_terminates_immediately() {
        let owned = OwnedRangeSet::<M>::new(vec![]);
        let snapshot = DiskBoundarySnapshot::single_slice(owned);
        let facade = Facade::new(snapshot);
        let mut tracker = facade.boundaries(4).unwrap();
        tracker.advance_to(tok(0.5));
        assert!(tracker.is_terminated());
        assert!(tracker.shard_end().is_none());
        assert!(!tracker.advance_to(tok(0.9)));
    }
}

//! Factory / façade: the crate's public entry point (`spec.md` §4.6, §6).

use crate::coverage::{range_spanned, DataFileDescriptor};
use crate::disk::DiskBoundarySnapshot;
use crate::error::Result;
use crate::owned::OwnedRangeSet;
use crate::plan::{build_plan, Plan};
use crate::token::RingToken;
use crate::tracker::ShardTracker;
use dashmap::DashMap;
use std::sync::Arc;

/// Planner façade over one `DiskBoundarySnapshot`.
///
/// Immutable after construction and shareable across threads: `Plan`s are
/// memoized per shard count in an append-only map, and `range_spanned` is
/// pure. Construction must happen-before sharing; the calling engine
/// supplies that ordering via its own compaction-job setup (`spec.md` §5).
pub struct Facade<T: RingToken> {
    snapshot: DiskBoundarySnapshot<T>,
    plans: DashMap<usize, Arc<Plan<T>>>,
}

impl<T: RingToken> Facade<T> {
    /// Builds a façade over a materialized disk-boundary snapshot. If the
    /// snapshot has a single disk slice, this is equivalent to the
    /// no-disks path.
    pub fn new(snapshot: DiskBoundarySnapshot<T>) -> Self {
        Self {
            snapshot,
            plans: DashMap::new(),
        }
    }

    /// Alias matching the language-neutral surface of `spec.md` §6.
    pub fn create(snapshot: DiskBoundarySnapshot<T>) -> Self {
        Self::new(snapshot)
    }

    /// The no-disks path: the entire owned space is a single slice.
    pub fn create_no_disks(owned: OwnedRangeSet<T>) -> Self {
        Self::new(DiskBoundarySnapshot::single_slice(owned))
    }

    pub fn owned(&self) -> &OwnedRangeSet<T> {
        self.snapshot.owned()
    }

    /// Stateless query: what fraction of owned token space does this file
    /// span? Safe to call concurrently.
    pub fn range_spanned(&self, descriptor: &DataFileDescriptor<T>) -> f64 {
        range_spanned(descriptor, self.snapshot.owned())
    }

    /// The raw, shared `Plan` for `shard_count`, building and memoizing it
    /// on first use. Concurrent callers racing to build the same
    /// `shard_count` both compute a `Plan`; only the first to register it
    /// is kept; the other is discarded (`spec.md` §5).
    pub fn plan_for(&self, shard_count: usize) -> Result<Arc<Plan<T>>> {
        if let Some(existing) = self.plans.get(&shard_count) {
            return Ok(Arc::clone(&existing));
        }
        let built = Arc::new(build_plan(&self.snapshot, shard_count)?);
        let winner = self.plans.entry(shard_count).or_insert_with(|| built);
        Ok(Arc::clone(&winner))
    }

    /// Mints a fresh, single-owner `ShardTracker` over the memoized `Plan`
    /// for `shard_count`.
    pub fn boundaries(&self, shard_count: usize) -> Result<ShardTracker<T>> {
        let plan = self.plan_for(shard_count)?;
        Ok(ShardTracker::new(plan))
    }
}

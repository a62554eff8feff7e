//! Shard planner: combines disk boundaries with equal-weighted splits of
//! the owned space restricted to each disk slice (`spec.md` §4.4).

use crate::disk::DiskBoundarySnapshot;
use crate::error::{Error, Result};
use crate::owned::{OwnedRangeSet, WeightedRange};
use crate::range::Range;
use crate::token::RingToken;
use crate::EPSILON;

/// One shard's `[start, end)` window. `end` is absent only for the very
/// last shard of the whole plan, meaning "unbounded forward" (`spec.md`
/// §4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShardDescriptor<T: RingToken> {
    pub start: T,
    pub end: Option<T>,
}

/// The computed, immutable layout of `disk_count * shard_count` shard
/// boundaries for one `(snapshot, shard_count)` pair.
#[derive(Debug, Clone)]
pub struct Plan<T: RingToken> {
    shards: Vec<ShardDescriptor<T>>,
}

impl<T: RingToken> Plan<T> {
    pub fn shards(&self) -> &[ShardDescriptor<T>] {
        &self.shards
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}

/// Builds a `Plan` with exactly `disk_count * shard_count` shards, or an
/// empty `Plan` when the owned set has zero total weighted size — an owner
/// of nothing has nothing to shard, and a `ShardTracker` over it must
/// terminate immediately (`spec.md` §7) rather than enumerate degenerate
/// placeholder shards.
pub fn build_plan<T: RingToken>(snapshot: &DiskBoundarySnapshot<T>, shard_count: usize) -> Result<Plan<T>> {
    if shard_count < 1 {
        return Err(Error::InvalidShardCount { requested: shard_count });
    }

    if snapshot.owned().total_weighted() <= EPSILON {
        return Ok(Plan { shards: Vec::new() });
    }

    let disk_count = snapshot.disk_count();
    let mut shards = Vec::with_capacity(disk_count * shard_count);

    for i in 0..disk_count {
        let (slice_start, slice_end) = snapshot.slice_bounds(i);
        let restricted = restrict_to_slice(snapshot.owned(), slice_start, slice_end);

        let mut interior = if shard_count == 1 {
            Vec::new()
        } else {
            restricted.split_into(shard_count)?
        };
        interior.retain(|b| *b != slice_start && *b != slice_end);
        // A degenerate slice (zero owned weighted size) produces fewer than
        // shard_count - 1 boundaries once consecutive duplicates collapse;
        // pad with the slice end so every slice still contributes exactly
        // shard_count shards, collapsed to a point at the tail end
        // (`spec.md` §4.4 "the slice's ends are still produced").
        while interior.len() < shard_count - 1 {
            interior.push(slice_end);
        }
        interior.truncate(shard_count - 1);

        let mut starts = Vec::with_capacity(shard_count);
        starts.push(slice_start);
        starts.extend(interior.iter().copied());
        let mut ends = interior;
        ends.push(slice_end);

        for (start, end) in starts.into_iter().zip(ends) {
            shards.push(ShardDescriptor { start, end: Some(end) });
        }
    }

    if let Some(last) = shards.last_mut() {
        last.end = None;
    }

    Ok(Plan { shards })
}

/// Clips `entry` to the `(slice_start, slice_end]` window, producing zero,
/// one, or two sub-ranges (two when the slice wraps relative to the
/// entry). Uses the same entry-rotated `size`/`split` technique as
/// `OwnedRangeSet::intersection_size`, so no raw ring position is ever
/// exposed outside `RingToken`.
fn clip_entry_to_slice<T: RingToken>(entry: &WeightedRange<T>, slice_start: T, slice_end: T) -> Vec<WeightedRange<T>> {
    // D == 1: the whole ring is one slice, every owned entry is inside it.
    if slice_start == slice_end {
        return vec![*entry];
    }
    // The node owns the whole ring but disks split it into genuine slices:
    // the overlap with this slice is exactly the slice itself.
    if entry.range.left == entry.range.right {
        return vec![WeightedRange {
            range: Range::new(slice_start, slice_end),
            weight: entry.weight,
        }];
    }

    let entry_len = T::size(entry.range.left, entry.range.right);
    if entry_len <= 0.0 {
        return Vec::new();
    }
    let s_lo = T::size(entry.range.left, slice_start);
    let s_hi = T::size(entry.range.left, slice_end);

    let mut pieces = Vec::new();
    let mut push = |lo: f64, hi: f64| {
        let lo = lo.max(0.0);
        let hi = hi.min(entry_len);
        if hi - lo <= EPSILON {
            return;
        }
        let left = if lo <= EPSILON {
            entry.range.left
        } else {
            T::split(entry.range.left, entry.range.right, lo / entry_len)
        };
        let right = if (entry_len - hi).abs() <= EPSILON {
            entry.range.right
        } else {
            T::split(entry.range.left, entry.range.right, hi / entry_len)
        };
        pieces.push(WeightedRange {
            range: Range::new(left, right),
            weight: entry.weight,
        });
    };

    if s_hi >= s_lo {
        push(s_lo, s_hi);
    } else {
        push(s_lo, entry_len);
        push(0.0, s_hi);
    }
    pieces
}

fn restrict_to_slice<T: RingToken>(owned: &OwnedRangeSet<T>, slice_start: T, slice_end: T) -> OwnedRangeSet<T> {
    let mut out = Vec::new();
    for entry in owned.entries() {
        out.extend(clip_entry_to_slice(entry, slice_start, slice_end));
    }
    OwnedRangeSet::new(out)
}

//! Property tests for the universally-quantified invariants in the
//! component design, mirroring the teacher's `corelib/tests/ring_test.rs`
//! use of `proptest` for ring-arithmetic laws.

use proptest::prelude::*;
use shard_planner::token::Murmur3RingToken as M;
use shard_planner::{DataFileDescriptor, Facade, OwnedRangeSet, Range, RingToken, WeightedRange};

fn tok(p: f64) -> M {
    M::split(M::minimum(), M::minimum(), p)
}

fn sorted_disjoint_fractions(mut cuts: Vec<f64>) -> Vec<(f64, f64)> {
    cuts.retain(|c| *c > 0.0 && *c < 1.0);
    cuts.sort_by(|a, b| a.partial_cmp(b).unwrap());
    cuts.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
    let mut out = Vec::new();
    let mut i = 0;
    while i + 1 < cuts.len() {
        out.push((cuts[i], cuts[i + 1]));
        i += 2;
    }
    out
}

proptest! {
    /// `intersection_size` is additive over a split of the query range: the
    /// owned intersection with `[a, c)` equals the sum of the intersections
    /// with `[a, b)` and `[b, c)` for any `b` strictly between `a` and `c`.
    #[test]
    fn intersection_additivity(
        cuts in prop::collection::vec(0.0f64..1.0, 4..12),
        a in 0.0f64..0.4, mid_frac in 0.55f64..0.95, c in 0.96f64..1.0,
    ) {
        let pieces = sorted_disjoint_fractions(cuts);
        prop_assume!(!pieces.is_empty());
        let entries: Vec<_> = pieces
            .into_iter()
            .map(|(l, r)| WeightedRange::new(tok(l), tok(r), 1.0).unwrap())
            .collect();
        let owned = OwnedRangeSet::new(entries);

        let whole = Range::new(tok(a), tok(c));
        let mid = tok(mid_frac);
        let left = Range::new(tok(a), mid);
        let right = Range::new(mid, tok(c));

        let sum = owned.intersection_size(left) + owned.intersection_size(right);
        prop_assert!((owned.intersection_size(whole) - sum).abs() < 1e-6);
    }

    /// A full-ring owner's intersection with any query range equals the
    /// query's own size exactly (the identity case of §4.2).
    #[test]
    fn full_ring_identity(a in 0.0f64..1.0, width in 0.001f64..0.999) {
        let b = (a + width) % 1.0;
        prop_assume!((a - b).abs() > 1e-6);
        let owned = OwnedRangeSet::<M>::full(1.0).unwrap();
        let q = Range::new(tok(a), tok(b));
        let got = owned.intersection_size(q);
        prop_assert!((got - q.size()).abs() < 1e-6);
    }

    /// `build_plan` always produces exactly `disk_count * shard_count`
    /// shard descriptors, and the final descriptor's `end` is always `None`.
    #[test]
    fn shard_count_invariant(disk_cuts in prop::collection::vec(0.05f64..0.95, 0..4), shard_count in 1usize..6) {
        let mut positions: Vec<f64> = disk_cuts;
        positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
        positions.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
        let disk_count = positions.len() + 1;
        let mut toks: Vec<M> = positions.iter().map(|p| tok(*p)).collect();
        toks.push(tok(1.0));

        let owned = OwnedRangeSet::<M>::full(1.0).unwrap();
        let snapshot = shard_planner::DiskBoundarySnapshot::new(owned, toks).unwrap();
        let facade = Facade::new(snapshot);
        let plan = facade.plan_for(shard_count).unwrap();

        prop_assert_eq!(plan.len(), disk_count * shard_count);
        prop_assert!(plan.shards().last().unwrap().end.is_none());
    }

    /// `split_into(k)` always returns at most `k - 1` boundaries, and every
    /// boundary it does return falls strictly inside the owned set's span.
    #[test]
    fn weighted_split_bounded(weights in prop::collection::vec(0.1f64..5.0, 1..6), k in 1usize..5) {
        let n = weights.len();
        let mut entries = Vec::with_capacity(n);
        for (i, w) in weights.iter().enumerate() {
            let l = i as f64 / n as f64;
            let r = (i + 1) as f64 / n as f64;
            entries.push(WeightedRange::new(tok(l), tok(r), *w).unwrap());
        }
        let owned = OwnedRangeSet::new(entries);
        let boundaries = owned.split_into(k).unwrap();
        prop_assert!(boundaries.len() <= k - 1);
    }

    /// `range_spanned` always honors a positive finite `reported_coverage`
    /// verbatim, regardless of the owned set or descriptor range.
    #[test]
    fn positive_reported_coverage_always_wins(coverage in 1e-9f64..1.0, a in 0.0f64..0.4, width in 0.01f64..0.5) {
        let b = a + width;
        let owned = OwnedRangeSet::<M>::full(1.0).unwrap();
        let facade = Facade::create_no_disks(owned);
        let d = DataFileDescriptor::new(tok(a), tok(b), Some(coverage)).unwrap();
        prop_assert_eq!(facade.range_spanned(&d), coverage);
    }

    /// Non-positive or non-finite `reported_coverage` is always equivalent
    /// to `None` for `range_spanned`.
    #[test]
    fn bad_reported_coverage_matches_absent(bad in prop_oneof![Just(0.0), Just(-1.0), Just(f64::NAN)], a in 0.0f64..0.4, width in 0.01f64..0.5) {
        let b = a + width;
        let owned = OwnedRangeSet::<M>::full(1.0).unwrap();
        let facade = Facade::create_no_disks(owned);
        let with_bad = DataFileDescriptor::new(tok(a), tok(b), Some(bad)).unwrap();
        let with_none = DataFileDescriptor::new(tok(a), tok(b), None).unwrap();
        prop_assert_eq!(facade.range_spanned(&with_bad), facade.range_spanned(&with_none));
    }
}

//! Owned-range set: the node's weighted slice of the token ring.

use crate::error::{Error, Result};
use crate::range::Range;
use crate::token::RingToken;
use crate::EPSILON;

/// A `Range` plus a positive replication-style weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedRange<T: RingToken> {
    pub range: Range<T>,
    pub weight: f64,
}

impl<T: RingToken> WeightedRange<T> {
    pub fn new(left: T, right: T, weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::CorruptWeight {
                reason: format!("weight must be positive and finite, got {weight}"),
            });
        }
        Ok(Self {
            range: Range::new(left, right),
            weight,
        })
    }

    /// `weight * size(left, right)`.
    pub fn weighted_size(&self) -> f64 {
        self.weight * self.range.size()
    }
}

/// A sorted, pairwise-disjoint sequence of `WeightedRange`s covering the
/// token ranges this node owns, starting at the smallest `left` endpoint in
/// ring order (`spec.md` §3).
#[derive(Debug, Clone)]
pub struct OwnedRangeSet<T: RingToken> {
    entries: Vec<WeightedRange<T>>,
}

impl<T: RingToken> OwnedRangeSet<T> {
    /// Builds a set from already-disjoint ranges, sorting them into ring
    /// order by `left`. Disjointness is a caller invariant (`spec.md` §3);
    /// this constructor does not re-validate it beyond sorting.
    pub fn new(mut entries: Vec<WeightedRange<T>>) -> Self {
        entries.sort_by_key(|e| e.range.left);
        Self { entries }
    }

    /// The special case of a node owning the entire ring.
    pub fn full(weight: f64) -> Result<Self> {
        let entry = WeightedRange {
            range: Range::full(),
            weight: if weight.is_finite() && weight > 0.0 {
                weight
            } else {
                return Err(Error::CorruptWeight {
                    reason: format!("weight must be positive and finite, got {weight}"),
                });
            },
        };
        Ok(Self { entries: vec![entry] })
    }

    pub fn entries(&self) -> &[WeightedRange<T>] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `Σ size(r)` over owned entries — the owned fraction of the ring.
    pub fn total_unweighted(&self) -> f64 {
        self.entries.iter().map(|e| e.range.size()).sum()
    }

    /// `Σ weight * size(r)` over owned entries.
    pub fn total_weighted(&self) -> f64 {
        self.entries.iter().map(|e| e.weighted_size()).sum()
    }

    /// Human-readable summary of this owned set: entry count and
    /// unweighted/weighted coverage fractions, one range per line.
    pub fn describe(&self) -> String
    where
        T: std::fmt::Display,
    {
        let mut description = String::new();
        description.push_str("OwnedRangeSet:\n");
        description.push_str(&format!("  Entries: {}\n", self.entries.len()));
        description.push_str(&format!("  Total unweighted: {:.6}\n", self.total_unweighted()));
        description.push_str(&format!("  Total weighted: {:.6}\n", self.total_weighted()));
        for entry in &self.entries {
            description.push_str(&format!("    {} weight={}\n", entry.range, entry.weight));
        }
        description
    }

    /// Unweighted intersection length between `query` and the owned set.
    ///
    /// A query with `left == right == minimum()` denotes the whole ring
    /// (`spec.md` §4.2), so intersecting it returns `total_unweighted`.
    /// Otherwise each entry contributes `size(entry ∩ query)`, computed by
    /// rotating the ring so `entry.left` sits at zero: the entry always
    /// occupies `[0, entry_len)` in the rotated frame, and `query`'s
    /// endpoints land at `size(entry.left, query.left)` /
    /// `size(entry.left, query.right)`, splitting into one or two
    /// non-wrapping pieces there if the query itself wraps relative to the
    /// entry. This avoids ever exposing a raw ring position outside the
    /// abstract `RingToken` interface.
    pub fn intersection_size(&self, query: Range<T>) -> f64 {
        if query.left == query.right && query.left == T::minimum() {
            return self.total_unweighted();
        }
        self.entries
            .iter()
            .map(|e| arc_intersection::<T>(e.range.left, e.range.right, query.left, query.right))
            .sum()
    }

    /// Interior boundary tokens splitting this set into `k` equal-weighted
    /// pieces (`spec.md` §4.2). Returns `k - 1` tokens. A degenerate set
    /// with zero total weighted size yields no boundaries — there is no
    /// weighted mass to divide.
    pub fn split_into(&self, k: usize) -> Result<Vec<T>> {
        if k == 0 {
            return Err(Error::InvalidShardCount { requested: k });
        }
        if k == 1 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let total_weighted = self.total_weighted();
        if total_weighted <= EPSILON {
            return Ok(Vec::new());
        }

        let step = total_weighted / k as f64;
        let mut boundaries = Vec::with_capacity(k - 1);
        let mut acc = 0.0f64;
        let mut next_target = step;

        for entry in &self.entries {
            let entry_w = entry.weighted_size();
            while boundaries.len() < k - 1 && acc + entry_w + EPSILON >= next_target {
                let remainder_w = (next_target - acc).max(0.0);
                let boundary = if remainder_w <= EPSILON {
                    entry.range.left
                } else if (entry_w - remainder_w).abs() <= EPSILON {
                    entry.range.right
                } else {
                    let entry_unweighted = entry.range.size();
                    let unweighted_remainder = remainder_w / entry.weight;
                    let frac = (unweighted_remainder / entry_unweighted).clamp(0.0, 1.0);
                    T::split(entry.range.left, entry.range.right, frac)
                };
                if boundaries.last() != Some(&boundary) {
                    boundaries.push(boundary);
                }
                next_target += step;
            }
            acc += entry_w;
        }
        Ok(boundaries)
    }
}

/// `size(entry ∩ query)` where both arcs are expressed as forward `(left,
/// right]` pairs that may individually wrap. Uses only `RingToken::size`.
fn arc_intersection<T: RingToken>(entry_left: T, entry_right: T, query_left: T, query_right: T) -> f64 {
    let entry_len = T::size(entry_left, entry_right);
    if entry_len == 0.0 {
        return 0.0;
    }
    let q_lo = T::size(entry_left, query_left);
    let q_hi = T::size(entry_left, query_right);
    if q_hi >= q_lo {
        overlap_1d(0.0, entry_len, q_lo, q_hi)
    } else {
        overlap_1d(0.0, entry_len, q_lo, 1.0) + overlap_1d(0.0, entry_len, 0.0, q_hi)
    }
}

fn overlap_1d(a_lo: f64, a_hi: f64, b_lo: f64, b_hi: f64) -> f64 {
    let lo = a_lo.max(b_lo);
    let hi = a_hi.min(b_hi);
    if hi > lo {
        hi - lo
    } else {
        0.0
    }
}

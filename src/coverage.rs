//! Range-spanned calculator: "what fraction of owned token space does this
//! data file cover?" (`spec.md` §4.3). Drives compaction density accounting.

use crate::error::{Error, Result};
use crate::owned::OwnedRangeSet;
use crate::range::Range;
use crate::token::RingToken;

/// Describes a single on-disk data file for the purposes of coverage
/// accounting. `reported_coverage`, when present and strictly positive, is
/// the file's own estimate of the fraction of token space it spans.
#[derive(Debug, Clone, Copy)]
pub struct DataFileDescriptor<T: RingToken> {
    pub first: T,
    pub last: T,
    pub reported_coverage: Option<f64>,
}

impl<T: RingToken> DataFileDescriptor<T> {
    pub fn new(first: T, last: T, reported_coverage: Option<f64>) -> Result<Self> {
        if last < first {
            return Err(Error::InvalidDescriptor {
                reason: "first must be <= last in ring order".to_string(),
            });
        }
        Ok(Self {
            first,
            last,
            reported_coverage,
        })
    }
}

/// Decision table from `spec.md` §4.3, applied in order:
///
/// 1. `first == last` (single-partition file) -> `1.0`, unconditionally.
/// 2. A positive, finite, non-NaN `reported_coverage` -> that value.
/// 3. Otherwise, the raw intersection against `owned`; if that intersection
///    is exactly zero (file lies entirely outside owned space), the
///    "out-of-local-range correction" applies and the file is treated as a
///    standalone unit worth `1.0`.
///
/// NaN, zero, and negative `reported_coverage` are silently treated as
/// absent and fall through to rule 3.
pub fn range_spanned<T: RingToken>(descriptor: &DataFileDescriptor<T>, owned: &OwnedRangeSet<T>) -> f64 {
    if descriptor.first == descriptor.last {
        return 1.0;
    }
    if let Some(c) = descriptor.reported_coverage {
        if c.is_finite() && c > 0.0 {
            return c;
        }
    }
    let query = Range::new(descriptor.first, descriptor.last);
    let raw = owned.intersection_size(query);
    if raw > 0.0 {
        raw
    } else {
        1.0
    }
}

//! Error types for the shard planner.

use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Precondition violations raised synchronously at a public constructor or
/// query boundary. Callers are expected to validate upstream; this crate
/// never retries or recovers from these (`spec.md` §7).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// `boundaries(shard_count)` called with `shard_count < 1`.
    #[error("shard count must be >= 1, got {requested}")]
    InvalidShardCount { requested: usize },

    /// A `DataFileDescriptor` with `first > last` in ring order.
    #[error("invalid data file descriptor: {reason}")]
    InvalidDescriptor { reason: String },

    /// A `DiskBoundarySnapshot` whose boundary list is not monotone in ring
    /// order, or whose length doesn't match its declared disk count.
    #[error("invalid disk boundaries: {reason}")]
    InvalidBoundaries { reason: String },

    /// A `WeightedRange` with a non-positive or NaN weight.
    #[error("corrupt range weight: {reason}")]
    CorruptWeight { reason: String },
}

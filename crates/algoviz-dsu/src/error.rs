//! Error types for algoviz-dsu.

use thiserror::Error;

/// Result type for disjoint-set operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by [`DisjointSet`](crate::DisjointSet).
///
/// Every variant is a caller contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// An element index outside `0..len` was passed in.
    #[error("index {index} out of range for disjoint set of {len} elements")]
    IndexOutOfRange { index: usize, len: usize },
}

//! Disjoint-set forest (union-find).
//!
//! Tracks which elements of `0..n` belong to the same component. Used by
//! Kruskal's algorithm to decide whether an edge would close a cycle.
//!
//! # Complexity
//!
//! With path compression in [`DisjointSet::find`] and union by rank in
//! [`DisjointSet::union`], a sequence of `m` operations over `n` elements runs
//! in `O(m α(n))`, where `α` is the inverse Ackermann function.

mod error;
mod set;

pub use error::{Error, Result};
pub use set::DisjointSet;

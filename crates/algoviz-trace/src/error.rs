//! Error types for algoviz-trace.

use thiserror::Error;

/// Result type for trace generation and input validation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning external input into a trace.
#[derive(Debug, Error)]
pub enum Error {
    /// The problem instance was rejected before generation started.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A generator broke one of its own contracts. Always a bug.
    #[error("algorithm invariant violated: {0}")]
    Invariant(#[from] InvariantError),

    /// The raw input was not well-formed JSON for the requested algorithm.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<algoviz_dsu::Error> for Error {
    fn from(e: algoviz_dsu::Error) -> Self {
        Error::Invariant(InvariantError::DisjointSet(e))
    }
}

/// Internal contract violations raised during generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// The disjoint-set forest was handed an index it does not own.
    #[error("disjoint set: {0}")]
    DisjointSet(#[from] algoviz_dsu::Error),

    /// A generator finished without recording a single step.
    #[error("trace must contain at least one step")]
    EmptyTrace,

    /// A start vertex outside the graph was handed to a generator.
    #[error("start vertex index {start} out of range for {len} vertices")]
    StartOutOfRange { start: usize, len: usize },
}

/// A malformed or out-of-range problem instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The algorithm name is not one we know.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("graph has {count} vertices, at most {max} allowed")]
    TooManyVertices { count: usize, max: usize },

    #[error("graph has {count} edges, at most {max} allowed")]
    TooManyEdges { count: usize, max: usize },

    #[error("vertex id {id} appears more than once")]
    DuplicateVertex { id: i64 },

    #[error("vertex {id} has a non-finite position")]
    InvalidPosition { id: i64 },

    #[error("edge {edge} references unknown vertex {id}")]
    UnknownVertex { edge: usize, id: i64 },

    #[error("edge {edge} has a non-finite weight")]
    InvalidWeight { edge: usize },

    #[error("start vertex {id} does not exist")]
    UnknownStart { id: i64 },

    #[error("words must not be empty")]
    EmptyWord,

    #[error("word {word:?} has length {len}, expected {expected}")]
    WordLengthMismatch {
        word: String,
        len: usize,
        expected: usize,
    },

    #[error("end word {0:?} is not in the word list")]
    EndWordMissing(String),

    #[error("word list has {count} entries, at most {max} allowed")]
    TooManyWords { count: usize, max: usize },

    #[error("a tour needs at least one city")]
    NoCities,

    #[error("tour has {count} cities, at most {max} allowed")]
    TooManyCities { count: usize, max: usize },

    #[error("city {index} has a non-finite position")]
    InvalidCity { index: usize },

    #[error("distance row {row} has {len} entries, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("distance from {from} to {to} must be finite and non-negative")]
    InvalidDistance { from: usize, to: usize },

    /// The instance is valid but its trace would outgrow the step budget.
    #[error("trace exceeds {max_bytes} bytes after {steps} steps")]
    TraceTooLarge { steps: usize, max_bytes: usize },
}

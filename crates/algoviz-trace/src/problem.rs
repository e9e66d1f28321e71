//! Problem instances and generator dispatch.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::generators::{
    BranchAndBound, DirectedCycle, Kruskal, LadderSearch, Prim, UndirectedCycle,
};
use crate::graph::{Graph, Point};
use crate::trace::Trace;

/// The closed set of algorithms that can produce a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Kruskal,
    Prim,
    Tsp,
    WordLadder,
    DirectedCycle,
    UndirectedCycle,
}

impl Algorithm {
    pub const ALL: [Self; 6] = [
        Self::Kruskal,
        Self::Prim,
        Self::Tsp,
        Self::WordLadder,
        Self::DirectedCycle,
        Self::UndirectedCycle,
    ];

    /// Stable machine name, as used in JSON and on the command line.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Kruskal => "kruskal",
            Self::Prim => "prim",
            Self::Tsp => "tsp",
            Self::WordLadder => "word_ladder",
            Self::DirectedCycle => "directed_cycle",
            Self::UndirectedCycle => "undirected_cycle",
        }
    }

    /// Human-readable title.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Kruskal => "Kruskal's minimum spanning tree",
            Self::Prim => "Prim's minimum spanning tree",
            Self::Tsp => "Travelling salesman (branch and bound)",
            Self::WordLadder => "Word ladder (bidirectional BFS)",
            Self::DirectedCycle => "Cycle detection (directed)",
            Self::UndirectedCycle => "Cycle detection (undirected)",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| ValidationError::UnknownAlgorithm(s.to_string()))
    }
}

/// A validated word-ladder instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordLadder {
    pub(crate) begin: String,
    pub(crate) end: String,
    pub(crate) dictionary: BTreeSet<String>,
}

impl WordLadder {
    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn dictionary(&self) -> &BTreeSet<String> {
        &self.dictionary
    }
}

/// A validated symmetric-or-not distance table between cities.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    pub(crate) distances: Vec<Vec<f64>>,
    pub(crate) positions: Option<Vec<Point>>,
}

impl DistanceMatrix {
    /// Euclidean distances between the given points.
    ///
    /// Positions are assumed finite; use the validator for untrusted input.
    pub fn euclidean(points: &[Point]) -> Self {
        let distances = points
            .iter()
            .map(|a| points.iter().map(|b| a.distance(b)).collect())
            .collect();
        Self {
            distances,
            positions: Some(points.to_vec()),
        }
    }

    pub fn city_count(&self) -> usize {
        self.distances.len()
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances[from][to]
    }

    /// City coordinates, when the instance was built from points.
    pub fn positions(&self) -> Option<&[Point]> {
        self.positions.as_deref()
    }
}

/// A validated problem instance, one variant per algorithm.
#[derive(Debug, Clone, PartialEq)]
pub enum Problem {
    Kruskal(Graph),
    Prim { graph: Graph, start: usize },
    Tsp(DistanceMatrix),
    WordLadder(WordLadder),
    DirectedCycle(Graph),
    UndirectedCycle(Graph),
}

impl Problem {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Problem::Kruskal(_) => Algorithm::Kruskal,
            Problem::Prim { .. } => Algorithm::Prim,
            Problem::Tsp(_) => Algorithm::Tsp,
            Problem::WordLadder(_) => Algorithm::WordLadder,
            Problem::DirectedCycle(_) => Algorithm::DirectedCycle,
            Problem::UndirectedCycle(_) => Algorithm::UndirectedCycle,
        }
    }
}

/// A pure, deterministic producer of traces.
///
/// Implementations never perform I/O and never keep a reference to the
/// instance once `generate` returns.
pub trait TraceGenerator {
    type Instance: ?Sized;

    fn generate(&self, instance: &Self::Instance) -> Result<Trace>;
}

/// Run the generator matching the problem's algorithm.
pub fn generate(problem: &Problem) -> Result<Trace> {
    let trace = match problem {
        Problem::Kruskal(graph) => Kruskal.generate(graph),
        Problem::Prim { graph, start } => Prim::starting_at(*start).generate(graph),
        Problem::Tsp(matrix) => BranchAndBound.generate(matrix),
        Problem::WordLadder(ladder) => LadderSearch.generate(ladder),
        Problem::DirectedCycle(graph) => DirectedCycle.generate(graph),
        Problem::UndirectedCycle(graph) => UndirectedCycle.generate(graph),
    }?;

    debug!(
        algorithm = %problem.algorithm(),
        steps = trace.len(),
        "Generated trace"
    );
    Ok(trace)
}

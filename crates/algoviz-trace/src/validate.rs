//! Boundary validation of externally supplied problem instances.
//!
//! Nothing reaches a generator without passing through here. A rejected
//! instance produces a [`ValidationError`] and no trace at all.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::graph::{Edge, Graph, GraphInput, Point, Vertex};
use crate::problem::{Algorithm, DistanceMatrix, Problem, WordLadder};

/// Upper bounds on instance size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    pub max_vertices: usize,
    pub max_edges: usize,
    /// Tour search is factorial in this
    pub max_cities: usize,
    pub max_words: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_vertices: 64,
            max_edges: 512,
            max_cities: 8,
            max_words: 10_000,
        }
    }
}

impl ValidationLimits {
    #[must_use]
    pub fn with_max_vertices(mut self, max: usize) -> Self {
        self.max_vertices = max;
        self
    }

    #[must_use]
    pub fn with_max_edges(mut self, max: usize) -> Self {
        self.max_edges = max;
        self
    }

    #[must_use]
    pub fn with_max_cities(mut self, max: usize) -> Self {
        self.max_cities = max;
        self
    }

    #[must_use]
    pub fn with_max_words(mut self, max: usize) -> Self {
        self.max_words = max;
        self
    }
}

/// Word-ladder input as supplied by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderInput {
    pub begin_word: String,
    pub end_word: String,
    pub word_list: Vec<String>,
}

/// Tour input: either city coordinates or an explicit distance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TourInput {
    Cities { cities: Vec<Point> },
    Matrix { distances: Vec<Vec<f64>> },
}

/// Graph input with an optional designated start vertex (Prim).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootedGraphInput {
    #[serde(flatten)]
    pub graph: GraphInput,
    #[serde(default)]
    pub start: Option<i64>,
}

impl GraphInput {
    /// Check ids, bounds and edge endpoints; map ids to dense indices.
    pub fn validate(&self, limits: &ValidationLimits) -> std::result::Result<Graph, ValidationError> {
        if self.vertices.len() > limits.max_vertices {
            return Err(ValidationError::TooManyVertices {
                count: self.vertices.len(),
                max: limits.max_vertices,
            });
        }
        if self.edges.len() > limits.max_edges {
            return Err(ValidationError::TooManyEdges {
                count: self.edges.len(),
                max: limits.max_edges,
            });
        }

        let mut seen = HashSet::with_capacity(self.vertices.len());
        let mut vertices = Vec::with_capacity(self.vertices.len());
        for v in &self.vertices {
            if !seen.insert(v.id) {
                return Err(ValidationError::DuplicateVertex { id: v.id });
            }
            let position = Point::new(v.x, v.y);
            if !position.is_finite() {
                return Err(ValidationError::InvalidPosition { id: v.id });
            }
            vertices.push(Vertex { id: v.id, position });
        }

        let index_of = |id: i64| self.vertices.iter().position(|v| v.id == id);
        let mut edges = Vec::with_capacity(self.edges.len());
        for (i, e) in self.edges.iter().enumerate() {
            let source = index_of(e.source)
                .ok_or(ValidationError::UnknownVertex { edge: i, id: e.source })?;
            let target = index_of(e.target)
                .ok_or(ValidationError::UnknownVertex { edge: i, id: e.target })?;
            if !e.weight.is_finite() {
                return Err(ValidationError::InvalidWeight { edge: i });
            }
            edges.push(Edge {
                source,
                target,
                weight: e.weight,
            });
        }

        Ok(Graph::new_unchecked(vertices, edges))
    }
}

impl RootedGraphInput {
    /// Validate the graph and resolve the start vertex (default: first).
    pub fn validate(
        &self,
        limits: &ValidationLimits,
    ) -> std::result::Result<(Graph, usize), ValidationError> {
        let graph = self.graph.validate(limits)?;
        let start = match self.start {
            Some(id) => graph
                .index_of(id)
                .ok_or(ValidationError::UnknownStart { id })?,
            None => 0,
        };
        Ok((graph, start))
    }
}

impl LadderInput {
    /// Check word lengths and that the end word is reachable in principle.
    pub fn validate(
        &self,
        limits: &ValidationLimits,
    ) -> std::result::Result<WordLadder, ValidationError> {
        if self.word_list.len() > limits.max_words {
            return Err(ValidationError::TooManyWords {
                count: self.word_list.len(),
                max: limits.max_words,
            });
        }

        let expected = self.begin_word.chars().count();
        if expected == 0 {
            return Err(ValidationError::EmptyWord);
        }
        for word in std::iter::once(&self.end_word).chain(&self.word_list) {
            let len = word.chars().count();
            if len == 0 {
                return Err(ValidationError::EmptyWord);
            }
            if len != expected {
                return Err(ValidationError::WordLengthMismatch {
                    word: word.clone(),
                    len,
                    expected,
                });
            }
        }

        if !self.word_list.contains(&self.end_word) {
            return Err(ValidationError::EndWordMissing(self.end_word.clone()));
        }

        Ok(WordLadder {
            begin: self.begin_word.clone(),
            end: self.end_word.clone(),
            dictionary: self.word_list.iter().cloned().collect::<BTreeSet<_>>(),
        })
    }
}

impl TourInput {
    pub fn validate(
        &self,
        limits: &ValidationLimits,
    ) -> std::result::Result<DistanceMatrix, ValidationError> {
        let count = match self {
            TourInput::Cities { cities } => cities.len(),
            TourInput::Matrix { distances } => distances.len(),
        };
        if count == 0 {
            return Err(ValidationError::NoCities);
        }
        if count > limits.max_cities {
            return Err(ValidationError::TooManyCities {
                count,
                max: limits.max_cities,
            });
        }

        match self {
            TourInput::Cities { cities } => {
                if let Some(index) = cities.iter().position(|c| !c.is_finite()) {
                    return Err(ValidationError::InvalidCity { index });
                }
                Ok(DistanceMatrix::euclidean(cities))
            }
            TourInput::Matrix { distances } => {
                for (from, row) in distances.iter().enumerate() {
                    if row.len() != count {
                        return Err(ValidationError::NonSquareMatrix {
                            row: from,
                            len: row.len(),
                            expected: count,
                        });
                    }
                    if let Some(to) = row.iter().position(|d| !d.is_finite() || *d < 0.0) {
                        return Err(ValidationError::InvalidDistance { from, to });
                    }
                }
                Ok(DistanceMatrix {
                    distances: distances.clone(),
                    positions: None,
                })
            }
        }
    }
}

impl Problem {
    /// Parse and validate raw JSON input for the given algorithm.
    pub fn from_json(algorithm: Algorithm, json: &str, limits: &ValidationLimits) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(algorithm, value, limits)
    }

    /// Validate an already-parsed JSON value for the given algorithm.
    pub fn from_value(
        algorithm: Algorithm,
        value: serde_json::Value,
        limits: &ValidationLimits,
    ) -> Result<Self> {
        let problem = match algorithm {
            Algorithm::Kruskal => {
                let input: GraphInput = serde_json::from_value(value)?;
                Problem::Kruskal(input.validate(limits)?)
            }
            Algorithm::Prim => {
                let input: RootedGraphInput = serde_json::from_value(value)?;
                let (graph, start) = input.validate(limits)?;
                Problem::Prim { graph, start }
            }
            Algorithm::Tsp => {
                let input: TourInput = serde_json::from_value(value)?;
                Problem::Tsp(input.validate(limits)?)
            }
            Algorithm::WordLadder => {
                let input: LadderInput = serde_json::from_value(value)?;
                Problem::WordLadder(input.validate(limits)?)
            }
            Algorithm::DirectedCycle => {
                let input: GraphInput = serde_json::from_value(value)?;
                Problem::DirectedCycle(input.validate(limits)?)
            }
            Algorithm::UndirectedCycle => {
                let input: GraphInput = serde_json::from_value(value)?;
                Problem::UndirectedCycle(input.validate(limits)?)
            }
        };
        Ok(problem)
    }
}

//! Step snapshots recorded during trace generation.
//!
//! A [`Step`] is a self-contained value: every list it carries is owned, so
//! a renderer can hold on to any step without caring about the ones around
//! it. Steps are never edited once recorded; a changed view is a new step.

use std::mem::size_of;

use serde::{Deserialize, Serialize};

use crate::graph::Point;

/// One snapshot of algorithm state plus its narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub description: String,
    pub payload: Payload,
}

impl Step {
    /// Approximate number of bytes this step keeps alive, inline and heap.
    pub fn footprint(&self) -> usize {
        size_of::<Self>() + self.description.len() + self.payload.heap_bytes()
    }
}

fn string_bytes(s: &str) -> usize {
    size_of::<String>() + s.len()
}

fn words_bytes(words: &[String]) -> usize {
    words.iter().map(|w| string_bytes(w)).sum()
}

/// Algorithm-specific part of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Minimum spanning tree construction (Kruskal, Prim)
    Mst(MstFrame),
    /// Cycle detection by depth-first search
    Cycle(CycleFrame),
    /// Bidirectional breadth-first search
    Search(SearchFrame),
    /// Branch-and-bound tour search
    Tour(TourFrame),
}

impl Payload {
    fn heap_bytes(&self) -> usize {
        match self {
            Payload::Mst(frame) => {
                frame.vertices.len() * size_of::<VertexView>()
                    + frame.edges.len() * size_of::<EdgeView>()
            }
            Payload::Cycle(frame) => {
                frame.vertices.len() * size_of::<VertexView>()
                    + frame.edges.len() * size_of::<EdgeView>()
                    + (frame.stack.len() + frame.cycle.len()) * size_of::<i64>()
            }
            Payload::Search(frame) => {
                frame.forward.heap_bytes()
                    + frame.backward.heap_bytes()
                    + frame
                        .rejected
                        .iter()
                        .map(|r| size_of::<Rejection>() + r.word.len())
                        .sum::<usize>()
                    + frame.meeting_point.as_deref().map_or(0, string_bytes)
                    + frame.best_path.as_deref().map_or(0, words_bytes)
            }
            Payload::Tour(frame) => {
                (frame.current_path.len() + frame.best_path.len()) * size_of::<usize>()
            }
        }
    }
}

/// Visit state of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitState {
    Unvisited,
    /// On the DFS stack
    InProgress,
    /// Fully explored
    Done,
    /// Part of the tree under construction
    InTree,
}

/// Role of an edge at the moment of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRole {
    Unprocessed,
    Candidate,
    IncludedInResult,
    Rejected,
    Current,
}

/// DFS edge classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeClass {
    Tree,
    Back,
    Forward,
    Cross,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexView {
    pub id: i64,
    pub position: Point,
    pub state: VisitState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    pub source: i64,
    pub target: i64,
    pub weight: f64,
    pub role: EdgeRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<EdgeClass>,
}

/// Spanning tree progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MstFrame {
    pub vertices: Vec<VertexView>,
    pub edges: Vec<EdgeView>,
    /// Sum of accepted edge weights so far
    pub total_weight: f64,
    /// Number of accepted edges so far
    pub accepted: usize,
    /// Set on the terminal step: whether the result spans every vertex
    pub spanning: Option<bool>,
}

impl MstFrame {
    /// Edges currently marked as part of the result.
    pub fn included_edges(&self) -> impl Iterator<Item = &EdgeView> {
        self.edges
            .iter()
            .filter(|e| e.role == EdgeRole::IncludedInResult)
    }
}

/// Depth-first cycle search progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleFrame {
    pub directed: bool,
    pub vertices: Vec<VertexView>,
    pub edges: Vec<EdgeView>,
    /// Vertex ids on the DFS stack, root first
    pub stack: Vec<i64>,
    /// Vertex ids of the detected cycle, in traversal order
    pub cycle: Vec<i64>,
    /// Set on the terminal step
    pub cycle_found: Option<bool>,
}

/// Which end of a bidirectional search a frontier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Growing from the begin word
    Forward,
    /// Growing from the end word
    Backward,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Backward => write!(f, "backward"),
        }
    }
}

/// A queued search node with the path that reached it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierEntry {
    pub node: String,
    pub path: Vec<String>,
    pub depth: usize,
}

/// One side of a bidirectional search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideView {
    /// Every word reached from this side, sorted
    pub visited: Vec<String>,
    /// Words still waiting to be expanded, in queue order
    pub frontier: Vec<FrontierEntry>,
}

impl SideView {
    fn heap_bytes(&self) -> usize {
        words_bytes(&self.visited)
            + self
                .frontier
                .iter()
                .map(|e| size_of::<FrontierEntry>() + e.node.len() + words_bytes(&e.path))
                .sum::<usize>()
    }
}

/// Why a candidate word was not added to the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotInDictionary,
    AlreadyVisited,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInDictionary => write!(f, "not in dictionary"),
            Self::AlreadyVisited => write!(f, "already visited"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub word: String,
    pub reason: RejectReason,
}

/// Bidirectional word-ladder search progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFrame {
    /// Side that is expanding in this step
    pub side: Direction,
    /// Number of completed level expansions
    pub level: usize,
    pub forward: SideView,
    pub backward: SideView,
    /// Candidates turned away during this expansion
    pub rejected: Vec<Rejection>,
    pub meeting_point: Option<String>,
    /// Shortest full ladder found so far
    pub best_path: Option<Vec<String>>,
    /// Set on the terminal step
    pub found: Option<bool>,
}

/// Branch-and-bound tour search progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourFrame {
    pub current_path: Vec<usize>,
    pub current_cost: f64,
    /// City being tested as the next hop
    pub candidate: Option<usize>,
    pub best_path: Vec<usize>,
    /// `None` until a full tour is found (+∞)
    pub best_cost: Option<f64>,
    pub pruned: bool,
    pub finished: bool,
}

//! Depth-first cycle detection on directed and undirected graphs.
//!
//! Roots are tried in vertex order and edges in input order, so the same
//! graph always yields the same trace. The search stops at the first cycle.

use super::Canvas;
use crate::error::Result;
use crate::graph::Graph;
use crate::problem::TraceGenerator;
use crate::step::{CycleFrame, EdgeClass, EdgeRole, Payload, VisitState};
use crate::trace::{Recorder, Trace};

/// Three-colour DFS; an edge into an in-progress vertex closes a cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectedCycle;

/// DFS that remembers the edge it arrived by; any other edge to a visited
/// vertex closes a cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct UndirectedCycle;

struct Dfs<'a> {
    graph: &'a Graph,
    directed: bool,
    adjacency: Vec<Vec<usize>>,
    canvas: Canvas<'a>,
    rec: Recorder,
    discovered: Vec<usize>,
    clock: usize,
    /// Vertex indices, root first
    stack: Vec<usize>,
    /// `edge_stack[k]` is the tree edge leading into `stack[k + 1]`
    edge_stack: Vec<usize>,
    cycle: Vec<usize>,
}

impl<'a> Dfs<'a> {
    fn new(graph: &'a Graph, directed: bool) -> Self {
        let adjacency = if directed {
            graph.out_edges()
        } else {
            graph.incident_edges()
        };
        Self {
            graph,
            directed,
            adjacency,
            canvas: Canvas::new(graph),
            rec: Recorder::default(),
            discovered: vec![0; graph.vertex_count()],
            clock: 0,
            stack: Vec::new(),
            edge_stack: Vec::new(),
            cycle: Vec::new(),
        }
    }

    fn record(&mut self, description: String, cycle_found: Option<bool>) {
        let graph = self.graph;
        let ids = |indices: &[usize]| -> Vec<i64> { indices.iter().map(|&v| graph.id(v)).collect() };
        let frame = CycleFrame {
            directed: self.directed,
            vertices: self.canvas.vertices(),
            edges: self.canvas.edges(),
            stack: ids(&self.stack),
            cycle: ids(&self.cycle),
            cycle_found,
        };
        self.rec.push(description, Payload::Cycle(frame));
    }

    fn link(&self, from: usize, to: usize) -> String {
        let arrow = if self.directed { "→" } else { "-" };
        format!("{}{}{}", self.graph.id(from), arrow, self.graph.id(to))
    }

    /// Close a cycle with `edge` from `u` back to `v`.
    fn close_cycle(&mut self, u: usize, v: usize, edge: usize) {
        match self.stack.iter().position(|&w| w == v) {
            Some(pos) => {
                self.cycle = self.stack[pos..].to_vec();
                for &e in &self.edge_stack[pos..] {
                    self.canvas.set_role(e, EdgeRole::IncludedInResult);
                }
            }
            // v already finished: the two endpoints still witness the cycle
            None => self.cycle = vec![v, u],
        }
        self.canvas.classify(edge, EdgeClass::Back, EdgeRole::IncludedInResult);
    }

    /// Explore from `u`; returns `true` once a cycle is found.
    fn visit(&mut self, u: usize, parent_edge: Option<usize>) -> bool {
        self.clock += 1;
        self.discovered[u] = self.clock;
        self.stack.push(u);
        self.canvas.set_state(u, VisitState::InProgress);
        self.record(format!("Entering vertex {} (in progress)", self.graph.id(u)), None);

        let incident = self.adjacency[u].clone();
        for e in incident {
            let edge = self.graph.edges()[e];
            let v = if self.directed { edge.target } else { edge.other(u) };

            if !self.directed && parent_edge == Some(e) {
                self.record(
                    format!("Skipping edge {}: it leads back to the parent", self.link(u, v)),
                    None,
                );
                continue;
            }

            self.canvas.set_role(e, EdgeRole::Current);
            self.record(format!("Examining edge {}", self.link(u, v)), None);

            match self.canvas.state(v) {
                VisitState::Unvisited => {
                    self.canvas.classify(e, EdgeClass::Tree, EdgeRole::Candidate);
                    self.record(
                        format!(
                            "Tree edge {}: descending into vertex {}",
                            self.link(u, v),
                            self.graph.id(v)
                        ),
                        None,
                    );
                    self.edge_stack.push(e);
                    if self.visit(v, Some(e)) {
                        return true;
                    }
                    self.edge_stack.pop();
                }
                VisitState::InProgress => {
                    self.close_cycle(u, v, e);
                    self.record(
                        format!(
                            "Back edge {}: vertex {} is still on the stack, cycle found",
                            self.link(u, v),
                            self.graph.id(v)
                        ),
                        None,
                    );
                    return true;
                }
                VisitState::Done | VisitState::InTree if !self.directed => {
                    self.close_cycle(u, v, e);
                    self.record(
                        format!(
                            "Edge {} reaches visited vertex {}, cycle found",
                            self.link(u, v),
                            self.graph.id(v)
                        ),
                        None,
                    );
                    return true;
                }
                VisitState::Done | VisitState::InTree => {
                    let class = if self.discovered[u] < self.discovered[v] {
                        EdgeClass::Forward
                    } else {
                        EdgeClass::Cross
                    };
                    self.canvas.classify(e, class, EdgeRole::Rejected);
                    let kind = match class {
                        EdgeClass::Forward => "Forward",
                        _ => "Cross",
                    };
                    self.record(
                        format!(
                            "{} edge {}: vertex {} is already done, no cycle through it",
                            kind,
                            self.link(u, v),
                            self.graph.id(v)
                        ),
                        None,
                    );
                }
            }
        }

        self.stack.pop();
        self.canvas.set_state(u, VisitState::Done);
        self.record(format!("Finished vertex {} (done)", self.graph.id(u)), None);
        false
    }

    fn run(mut self) -> Result<Trace> {
        let kind = if self.directed { "directed" } else { "undirected" };
        self.record(
            format!(
                "Depth-first search for a cycle in a {} graph with {} vertices and {} edges",
                kind,
                self.graph.vertex_count(),
                self.graph.edge_count()
            ),
            None,
        );

        let mut found = false;
        for root in 0..self.graph.vertex_count() {
            if self.canvas.state(root) != VisitState::Unvisited {
                continue;
            }
            self.record(
                format!("Starting a new search tree at vertex {}", self.graph.id(root)),
                None,
            );
            if self.visit(root, None) {
                found = true;
                break;
            }
        }

        let summary = if found {
            let mut ids: Vec<String> = self
                .cycle
                .iter()
                .map(|&v| self.graph.id(v).to_string())
                .collect();
            if let Some(first) = ids.first().cloned() {
                ids.push(first);
            }
            let joiner = if self.directed { " → " } else { " - " };
            format!("Cycle found: {}", ids.join(joiner))
        } else if self.directed {
            "No cycle: the graph is acyclic".to_string()
        } else {
            "No cycle: the graph is a forest".to_string()
        };
        self.record(summary, Some(found));

        self.rec.finish()
    }
}

impl TraceGenerator for DirectedCycle {
    type Instance = Graph;

    fn generate(&self, graph: &Graph) -> Result<Trace> {
        Dfs::new(graph, true).run()
    }
}

impl TraceGenerator for UndirectedCycle {
    type Instance = Graph;

    fn generate(&self, graph: &Graph) -> Result<Trace> {
        Dfs::new(graph, false).run()
    }
}

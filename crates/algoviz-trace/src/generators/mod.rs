//! One trace generator per algorithm.

mod cycle;
mod kruskal;
mod prim;
mod tsp;
mod word_ladder;

pub use cycle::{DirectedCycle, UndirectedCycle};
pub use kruskal::Kruskal;
pub use prim::Prim;
pub use tsp::BranchAndBound;
pub use word_ladder::LadderSearch;

use crate::graph::Graph;
use crate::step::{EdgeClass, EdgeRole, EdgeView, VertexView, VisitState};

/// Mutable drawing state for graph generators.
///
/// Generators update vertex states and edge roles here, then copy the
/// current picture into each recorded step.
struct Canvas<'a> {
    graph: &'a Graph,
    states: Vec<VisitState>,
    roles: Vec<EdgeRole>,
    classes: Vec<Option<EdgeClass>>,
}

impl<'a> Canvas<'a> {
    fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            states: vec![VisitState::Unvisited; graph.vertex_count()],
            roles: vec![EdgeRole::Unprocessed; graph.edge_count()],
            classes: vec![None; graph.edge_count()],
        }
    }

    fn state(&self, vertex: usize) -> VisitState {
        self.states[vertex]
    }

    fn set_state(&mut self, vertex: usize, state: VisitState) {
        self.states[vertex] = state;
    }

    fn role(&self, edge: usize) -> EdgeRole {
        self.roles[edge]
    }

    fn set_role(&mut self, edge: usize, role: EdgeRole) {
        self.roles[edge] = role;
    }

    fn classify(&mut self, edge: usize, class: EdgeClass, role: EdgeRole) {
        self.classes[edge] = Some(class);
        self.roles[edge] = role;
    }

    fn vertices(&self) -> Vec<VertexView> {
        self.graph
            .vertices()
            .iter()
            .zip(&self.states)
            .map(|(v, &state)| VertexView {
                id: v.id,
                position: v.position,
                state,
            })
            .collect()
    }

    fn edges(&self) -> Vec<EdgeView> {
        self.graph
            .edges()
            .iter()
            .enumerate()
            .map(|(i, e)| EdgeView {
                source: self.graph.id(e.source),
                target: self.graph.id(e.target),
                weight: e.weight,
                role: self.roles[i],
                class: self.classes[i],
            })
            .collect()
    }
}

/// `a-b` label for an undirected edge, in caller-facing ids.
fn edge_label(graph: &Graph, edge: usize) -> String {
    let e = graph.edges()[edge];
    format!("{}-{}", graph.id(e.source), graph.id(e.target))
}

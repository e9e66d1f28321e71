//! Graph problem instances: raw JSON input and the validated form.

use serde::{Deserialize, Serialize};

/// A position on the drawing plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Custom graph as supplied by a user.
///
/// ```json
/// { "vertices": [{"id": 0, "x": 10, "y": 20}],
///   "edges": [{"source": 0, "target": 1, "weight": 4}] }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphInput {
    pub vertices: Vec<VertexInput>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexInput {
    pub id: i64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInput {
    pub source: i64,
    pub target: i64,
    /// Unweighted inputs (cycle detection) may leave this out
    #[serde(default = "unit_weight")]
    pub weight: f64,
}

fn unit_weight() -> f64 {
    1.0
}

impl GraphInput {
    /// Vertices `0..n` laid out on a circle, joined by the given edges.
    pub fn from_edges(n: usize, edges: &[(i64, i64, f64)]) -> Self {
        let vertices = (0..n)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / n.max(1) as f64;
                VertexInput {
                    id: i as i64,
                    x: 100.0 * angle.cos(),
                    y: 100.0 * angle.sin(),
                }
            })
            .collect();
        let edges = edges
            .iter()
            .map(|&(source, target, weight)| EdgeInput {
                source,
                target,
                weight,
            })
            .collect();
        Self { vertices, edges }
    }
}

/// A vertex of a validated graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Caller-facing id
    pub id: i64,
    pub position: Point,
}

/// An edge of a validated graph, endpoints as dense vertex indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

impl Edge {
    /// The endpoint opposite `vertex`.
    pub fn other(&self, vertex: usize) -> usize {
        if self.source == vertex {
            self.target
        } else {
            self.source
        }
    }

    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A graph that passed validation.
///
/// Vertices are indexed `0..vertex_count()` in input order; edges keep
/// their input order too. Generators rely on both orders for determinism.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Assemble a graph whose edges are already known to reference
    /// existing vertices.
    pub(crate) fn new_unchecked(vertices: Vec<Vertex>, edges: Vec<Edge>) -> Self {
        debug_assert!(edges
            .iter()
            .all(|e| e.source < vertices.len() && e.target < vertices.len()));
        Self { vertices, edges }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// External id of the vertex at `index`.
    pub fn id(&self, index: usize) -> i64 {
        self.vertices[index].id
    }

    /// Dense index of the vertex with the given external id.
    pub fn index_of(&self, id: i64) -> Option<usize> {
        self.vertices.iter().position(|v| v.id == id)
    }

    /// Outgoing edge indices per vertex, treating edges as directed.
    pub fn out_edges(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.vertices.len()];
        for (i, edge) in self.edges.iter().enumerate() {
            adjacency[edge.source].push(i);
        }
        adjacency
    }

    /// Incident edge indices per vertex, treating edges as undirected.
    ///
    /// A self loop is listed once.
    pub fn incident_edges(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.vertices.len()];
        for (i, edge) in self.edges.iter().enumerate() {
            adjacency[edge.source].push(i);
            if !edge.is_loop() {
                adjacency[edge.target].push(i);
            }
        }
        adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        let vertices = (0..3)
            .map(|i| Vertex {
                id: 10 + i,
                position: Point::default(),
            })
            .collect();
        let edges = vec![
            Edge { source: 0, target: 1, weight: 1.0 },
            Edge { source: 1, target: 2, weight: 2.0 },
            Edge { source: 2, target: 0, weight: 3.0 },
            Edge { source: 2, target: 2, weight: 0.5 },
        ];
        Graph::new_unchecked(vertices, edges)
    }

    #[test]
    fn ids_and_indices() {
        let g = triangle();
        assert_eq!(g.id(1), 11);
        assert_eq!(g.index_of(12), Some(2));
        assert_eq!(g.index_of(99), None);
    }

    #[test]
    fn directed_adjacency_keeps_input_order() {
        let g = triangle();
        assert_eq!(g.out_edges(), vec![vec![0], vec![1], vec![2, 3]]);
    }

    #[test]
    fn undirected_adjacency_lists_loops_once() {
        let g = triangle();
        assert_eq!(g.incident_edges(), vec![vec![0, 2], vec![0, 1], vec![1, 2, 3]]);
    }

    #[test]
    fn missing_weight_defaults_to_one() {
        let input: GraphInput = serde_json::from_str(
            r#"{"vertices":[{"id":1,"x":0,"y":0}],"edges":[{"source":1,"target":1}]}"#,
        )
        .unwrap();
        assert_eq!(input.edges[0].weight, 1.0);
    }

    #[test]
    fn point_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(&Point::new(3.0, 4.0)), 5.0);
    }
}

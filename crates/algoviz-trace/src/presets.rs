//! Built-in demo instances, one per algorithm.

use std::collections::BTreeSet;

use crate::graph::{Edge, Graph, Point, Vertex};
use crate::problem::{Algorithm, DistanceMatrix, Problem, WordLadder};

/// The instance shown when a session starts without user input.
pub fn demo(algorithm: Algorithm) -> Problem {
    match algorithm {
        Algorithm::Kruskal => Problem::Kruskal(weighted_graph()),
        Algorithm::Prim => Problem::Prim {
            graph: weighted_graph(),
            start: 0,
        },
        Algorithm::Tsp => Problem::Tsp(cities()),
        Algorithm::WordLadder => Problem::WordLadder(ladder()),
        Algorithm::DirectedCycle => Problem::DirectedCycle(directed_graph()),
        Algorithm::UndirectedCycle => Problem::UndirectedCycle(undirected_graph()),
    }
}

fn build(points: &[(f64, f64)], edges: &[(usize, usize, f64)]) -> Graph {
    let vertices = points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Vertex {
            id: i as i64,
            position: Point::new(x, y),
        })
        .collect();
    let edges = edges
        .iter()
        .map(|&(source, target, weight)| Edge {
            source,
            target,
            weight,
        })
        .collect();
    Graph::new_unchecked(vertices, edges)
}

fn weighted_graph() -> Graph {
    build(
        &[
            (80.0, 60.0),
            (220.0, 40.0),
            (360.0, 80.0),
            (60.0, 200.0),
            (200.0, 180.0),
            (340.0, 220.0),
            (200.0, 320.0),
        ],
        &[
            (0, 1, 7.0),
            (0, 3, 5.0),
            (1, 2, 8.0),
            (1, 3, 9.0),
            (1, 4, 7.0),
            (2, 4, 5.0),
            (3, 4, 15.0),
            (3, 6, 6.0),
            (4, 5, 8.0),
            (4, 6, 9.0),
            (5, 6, 11.0),
        ],
    )
}

fn cities() -> DistanceMatrix {
    DistanceMatrix::euclidean(&[
        Point::new(60.0, 60.0),
        Point::new(300.0, 80.0),
        Point::new(340.0, 260.0),
        Point::new(180.0, 320.0),
        Point::new(40.0, 220.0),
    ])
}

fn ladder() -> WordLadder {
    let dictionary: BTreeSet<String> = ["hot", "dot", "dog", "lot", "log", "cog"]
        .into_iter()
        .map(String::from)
        .collect();
    WordLadder {
        begin: "hit".to_string(),
        end: "cog".to_string(),
        dictionary,
    }
}

fn directed_graph() -> Graph {
    build(
        &[
            (60.0, 60.0),
            (200.0, 60.0),
            (340.0, 60.0),
            (340.0, 200.0),
            (200.0, 200.0),
            (60.0, 200.0),
        ],
        &[
            (0, 1, 1.0),
            (0, 5, 1.0),
            (1, 2, 1.0),
            (5, 4, 1.0),
            (2, 3, 1.0),
            (3, 4, 1.0),
            (4, 1, 1.0),
        ],
    )
}

fn undirected_graph() -> Graph {
    build(
        &[
            (60.0, 60.0),
            (200.0, 40.0),
            (340.0, 60.0),
            (120.0, 200.0),
            (280.0, 200.0),
            (200.0, 320.0),
        ],
        &[
            (0, 1, 1.0),
            (1, 2, 1.0),
            (0, 3, 1.0),
            (1, 4, 1.0),
            (4, 5, 1.0),
            (5, 3, 1.0),
        ],
    )
}

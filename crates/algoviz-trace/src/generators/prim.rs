//! Prim's minimum spanning tree.

use super::{edge_label, Canvas};
use crate::error::{InvariantError, Result};
use crate::graph::Graph;
use crate::problem::TraceGenerator;
use crate::step::{EdgeRole, MstFrame, Payload, VisitState};
use crate::trace::{Recorder, Trace};

/// Grows a single tree from a start vertex across the cheapest cut edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prim {
    start: usize,
}

impl Prim {
    /// Grow the tree from the vertex at dense index `start`.
    ///
    /// Generation fails with [`InvariantError::StartOutOfRange`] when the
    /// graph has no vertex at that index.
    pub fn starting_at(start: usize) -> Self {
        Self { start }
    }
}

fn frame(canvas: &Canvas<'_>, total_weight: f64, accepted: usize, spanning: Option<bool>) -> Payload {
    Payload::Mst(MstFrame {
        vertices: canvas.vertices(),
        edges: canvas.edges(),
        total_weight,
        accepted,
        spanning,
    })
}

/// Mark every unchosen edge with both ends inside the tree as rejected.
fn reject_internal(graph: &Graph, canvas: &mut Canvas<'_>, in_tree: &[bool]) {
    for (i, e) in graph.edges().iter().enumerate() {
        if in_tree[e.source] && in_tree[e.target] && canvas.role(i) != EdgeRole::IncludedInResult {
            canvas.set_role(i, EdgeRole::Rejected);
        }
    }
}

impl TraceGenerator for Prim {
    type Instance = Graph;

    fn generate(&self, graph: &Graph) -> Result<Trace> {
        let mut canvas = Canvas::new(graph);
        let mut rec = Recorder::default();
        let n = graph.vertex_count();

        if n == 0 && self.start == 0 {
            rec.push("Graph has no vertices", frame(&canvas, 0.0, 0, None));
            rec.push(
                "Nothing to span: the empty tree is trivially complete",
                frame(&canvas, 0.0, 0, Some(true)),
            );
            return rec.finish();
        }

        if self.start >= n {
            return Err(InvariantError::StartOutOfRange {
                start: self.start,
                len: n,
            }
            .into());
        }
        let start = self.start;
        let mut in_tree = vec![false; n];
        in_tree[start] = true;
        let mut tree_size = 1usize;
        canvas.set_state(start, VisitState::InTree);
        reject_internal(graph, &mut canvas, &in_tree);
        rec.push(
            format!("Starting Prim's algorithm from vertex {}", graph.id(start)),
            frame(&canvas, 0.0, 0, None),
        );

        let mut total = 0.0;
        let mut round = 0usize;

        while tree_size < n {
            let crossing: Vec<usize> = graph
                .edges()
                .iter()
                .enumerate()
                .filter(|(_, e)| in_tree[e.source] != in_tree[e.target])
                .map(|(i, _)| i)
                .collect();

            if crossing.is_empty() {
                break;
            }
            round += 1;

            for &e in &crossing {
                canvas.set_role(e, EdgeRole::Candidate);
            }
            rec.push(
                format!("Round {}: {} edges cross the cut", round, crossing.len()),
                frame(&canvas, total, tree_size - 1, None),
            );

            let key = |e: usize| {
                let edge = graph.edges()[e];
                (edge.weight, graph.id(edge.source), graph.id(edge.target))
            };
            let chosen = crossing
                .iter()
                .copied()
                .min_by(|&a, &b| {
                    let (wa, sa, ta) = key(a);
                    let (wb, sb, tb) = key(b);
                    wa.total_cmp(&wb).then(sa.cmp(&sb)).then(ta.cmp(&tb))
                })
                .unwrap_or(crossing[0]);

            let edge = graph.edges()[chosen];
            let joined = if in_tree[edge.source] { edge.target } else { edge.source };
            in_tree[joined] = true;
            tree_size += 1;
            total += edge.weight;

            for &e in &crossing {
                canvas.set_role(e, EdgeRole::Unprocessed);
            }
            canvas.set_role(chosen, EdgeRole::IncludedInResult);
            canvas.set_state(joined, VisitState::InTree);
            reject_internal(graph, &mut canvas, &in_tree);

            rec.push(
                format!(
                    "Added edge {} (weight {}); vertex {} joins the tree",
                    edge_label(graph, chosen),
                    edge.weight,
                    graph.id(joined)
                ),
                frame(&canvas, total, tree_size - 1, None),
            );
        }

        let spanning = tree_size == n;
        let summary = if spanning {
            format!(
                "Minimum spanning tree complete: {} edges, total weight {}",
                tree_size - 1,
                total
            )
        } else {
            format!(
                "No edge crosses the cut: only {} of {} vertices are reachable from vertex {}, the graph is disconnected",
                tree_size,
                n,
                graph.id(start)
            )
        };
        rec.push(summary, frame(&canvas, total, tree_size - 1, Some(spanning)));

        rec.finish()
    }
}

//! Kruskal's minimum spanning tree.

use algoviz_dsu::DisjointSet;

use super::{edge_label, Canvas};
use crate::error::Result;
use crate::graph::Graph;
use crate::problem::TraceGenerator;
use crate::step::{EdgeRole, MstFrame, Payload, VisitState};
use crate::trace::{Recorder, Trace};

/// Greedy edge selection in ascending weight order.
///
/// Ties keep input order (stable sort). The search stops as soon as
/// `|V| - 1` edges are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Kruskal;

fn frame(canvas: &Canvas<'_>, total_weight: f64, accepted: usize, spanning: Option<bool>) -> Payload {
    Payload::Mst(MstFrame {
        vertices: canvas.vertices(),
        edges: canvas.edges(),
        total_weight,
        accepted,
        spanning,
    })
}

impl TraceGenerator for Kruskal {
    type Instance = Graph;

    fn generate(&self, graph: &Graph) -> Result<Trace> {
        let mut canvas = Canvas::new(graph);
        let mut rec = Recorder::default();

        let n = graph.vertex_count();
        let needed = n.saturating_sub(1);

        let mut order: Vec<usize> = (0..graph.edge_count()).collect();
        order.sort_by(|&a, &b| graph.edges()[a].weight.total_cmp(&graph.edges()[b].weight));

        rec.push(
            format!(
                "Sorted {} edges by weight; a spanning tree over {} vertices needs {} edges",
                order.len(),
                n,
                needed
            ),
            frame(&canvas, 0.0, 0, None),
        );

        let mut set = DisjointSet::make(n);
        let mut total = 0.0;
        let mut accepted = 0usize;

        for &e in &order {
            if accepted == needed {
                break;
            }
            let edge = graph.edges()[e];
            let label = edge_label(graph, e);

            canvas.set_role(e, EdgeRole::Current);
            rec.push(
                format!("Considering edge {} (weight {})", label, edge.weight),
                frame(&canvas, total, accepted, None),
            );

            if set.find(edge.source)? == set.find(edge.target)? {
                canvas.set_role(e, EdgeRole::Rejected);
                rec.push(
                    format!("Rejected edge {}: both ends are already connected, it would form a cycle", label),
                    frame(&canvas, total, accepted, None),
                );
            } else {
                set.union(edge.source, edge.target)?;
                total += edge.weight;
                accepted += 1;
                canvas.set_role(e, EdgeRole::IncludedInResult);
                canvas.set_state(edge.source, VisitState::InTree);
                canvas.set_state(edge.target, VisitState::InTree);
                rec.push(
                    format!(
                        "Added edge {} (weight {}); {} of {} edges chosen",
                        label, edge.weight, accepted, needed
                    ),
                    frame(&canvas, total, accepted, None),
                );
            }
        }

        let spanning = accepted == needed;
        let summary = if spanning {
            for v in 0..n {
                canvas.set_state(v, VisitState::InTree);
            }
            format!(
                "Minimum spanning tree complete: {} edges, total weight {}",
                accepted, total
            )
        } else {
            format!(
                "Graph is disconnected: the {} chosen edges form a forest of {} trees (total weight {}), not a single spanning tree",
                accepted,
                set.set_count(),
                total
            )
        };
        rec.push(summary, frame(&canvas, total, accepted, Some(spanning)));

        rec.finish()
    }
}

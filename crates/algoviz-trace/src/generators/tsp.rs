//! Branch-and-bound search for the shortest closed tour.
//!
//! Depth-first over permutations that start at city 0, visiting children in
//! ascending city order. A branch is cut as soon as its partial cost reaches
//! the best closed tour found so far.
//!
//! Paths are passed down as immutable slices; each child gets a freshly
//! built path, so no recorded step ever shares state with the search.

use crate::error::Result;
use crate::problem::{DistanceMatrix, TraceGenerator};
use crate::step::{Payload, TourFrame};
use crate::trace::{Recorder, Trace};

#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBound;

struct Search<'a> {
    matrix: &'a DistanceMatrix,
    rec: Recorder,
    best_path: Vec<usize>,
    best_cost: Option<f64>,
}

impl Search<'_> {
    fn record(
        &mut self,
        description: String,
        path: &[usize],
        cost: f64,
        candidate: Option<usize>,
        pruned: bool,
    ) {
        let frame = TourFrame {
            current_path: path.to_vec(),
            current_cost: cost,
            candidate,
            best_path: self.best_path.clone(),
            best_cost: self.best_cost,
            pruned,
            finished: false,
        };
        self.rec.push(description, Payload::Tour(frame));
    }

    /// Search below `path`, whose partial cost is `cost`. `parent_cost` is
    /// the partial cost of `path` without its last city.
    fn explore(&mut self, path: &[usize], cost: f64, parent_cost: f64) {
        let n = self.matrix.city_count();
        let last = path[path.len() - 1];

        if path.len() == n {
            let closed = cost + self.matrix.distance(last, path[0]);
            let improves = self.best_cost.map_or(true, |best| closed < best);
            if improves {
                self.best_path = path.to_vec();
                self.best_cost = Some(closed);
                self.record(
                    format!("New best tour {} with cost {}", tour_label(path), closed),
                    path,
                    closed,
                    None,
                    false,
                );
            } else {
                self.record(
                    format!(
                        "Tour {} costs {}, no better than {}",
                        tour_label(path),
                        closed,
                        self.best_cost.unwrap_or(closed)
                    ),
                    path,
                    closed,
                    None,
                    false,
                );
            }
            return;
        }

        for next in 0..n {
            if path.contains(&next) {
                continue;
            }
            let partial = cost + self.matrix.distance(last, next);
            self.record(
                format!(
                    "Trying city {} after city {} (partial cost {})",
                    next, last, partial
                ),
                path,
                cost,
                Some(next),
                false,
            );

            if let Some(best) = self.best_cost {
                if partial >= best {
                    self.record(
                        format!(
                            "Pruned: partial cost {} already reaches best {}",
                            partial, best
                        ),
                        path,
                        cost,
                        Some(next),
                        true,
                    );
                    continue;
                }
            }

            let child: Vec<usize> = path.iter().copied().chain(std::iter::once(next)).collect();
            self.explore(&child, partial, cost);
        }

        let parent = &path[..path.len() - 1];
        let description = if parent.is_empty() {
            "All branches from the start city explored".to_string()
        } else {
            format!("Backtracking from city {}", last)
        };
        self.record(description, parent, parent_cost, None, false);
    }
}

fn tour_label(path: &[usize]) -> String {
    let mut parts: Vec<String> = path.iter().map(|c| c.to_string()).collect();
    if let Some(first) = path.first() {
        parts.push(first.to_string());
    }
    parts.join(" → ")
}

impl TraceGenerator for BranchAndBound {
    type Instance = DistanceMatrix;

    fn generate(&self, matrix: &DistanceMatrix) -> Result<Trace> {
        let mut search = Search {
            matrix,
            rec: Recorder::default(),
            best_path: Vec::new(),
            best_cost: None,
        };

        if matrix.city_count() == 0 {
            search.record("No cities to visit".to_string(), &[], 0.0, None, false);
            return search.rec.finish();
        }

        search.record(
            format!("Starting tour search at city 0 over {} cities", matrix.city_count()),
            &[0],
            0.0,
            None,
            false,
        );
        search.explore(&[0], 0.0, 0.0);

        let description = match search.best_cost {
            Some(cost) => format!(
                "Search complete: best tour {} with cost {}",
                tour_label(&search.best_path),
                cost
            ),
            None => "Search complete: no tour found".to_string(),
        };
        let frame = TourFrame {
            current_path: search.best_path.clone(),
            current_cost: search.best_cost.unwrap_or(0.0),
            candidate: None,
            best_path: search.best_path.clone(),
            best_cost: search.best_cost,
            pruned: false,
            finished: true,
        };
        search.rec.push(description, Payload::Tour(frame));

        search.rec.finish()
    }
}

//! Bidirectional breadth-first word-ladder search.
//!
//! Two frontiers grow from the begin and end words. Each turn expands one
//! complete level on one side, then hands over to the other side. A
//! candidate already reached by the other side is a meeting; the shortest
//! stitched ladder seen during that level wins and the search stops when
//! the level is done. Finishing the level before stopping is what makes
//! the first meeting level yield a shortest ladder.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::problem::{TraceGenerator, WordLadder};
use crate::step::{
    Direction, FrontierEntry, Payload, RejectReason, Rejection, SearchFrame, SideView,
};
use crate::trace::{Recorder, Trace};

#[derive(Debug, Clone, Copy, Default)]
pub struct LadderSearch;

/// Words reached from one root, each with the path that reached it.
struct Side {
    paths: BTreeMap<String, Vec<String>>,
    level: Vec<String>,
}

impl Side {
    fn new(root: &str) -> Self {
        let mut paths = BTreeMap::new();
        paths.insert(root.to_string(), vec![root.to_string()]);
        Self {
            paths,
            level: vec![root.to_string()],
        }
    }

    fn view(&self, pending: &[String], next: &[String]) -> SideView {
        SideView {
            visited: self.paths.keys().cloned().collect(),
            frontier: pending
                .iter()
                .chain(next)
                .filter_map(|word| {
                    self.paths.get(word).map(|path| FrontierEntry {
                        node: word.clone(),
                        path: path.clone(),
                        depth: path.len() - 1,
                    })
                })
                .collect(),
        }
    }
}

#[derive(Default)]
struct Progress {
    level: usize,
    meeting: Option<String>,
    best: Option<Vec<String>>,
}

fn frame(
    side: Direction,
    this: SideView,
    other: SideView,
    rejected: Vec<Rejection>,
    progress: &Progress,
    found: Option<bool>,
) -> Payload {
    let (forward, backward) = match side {
        Direction::Forward => (this, other),
        Direction::Backward => (other, this),
    };
    Payload::Search(SearchFrame {
        side,
        level: progress.level,
        forward,
        backward,
        rejected,
        meeting_point: progress.meeting.clone(),
        best_path: progress.best.clone(),
        found,
    })
}

/// Join a half path from the expanding side with the other side's half.
///
/// Forward halves run begin..word, backward halves run end..word.
fn stitch(side: Direction, this_path: &[String], other_path: &[String]) -> Vec<String> {
    let (from_begin, from_end) = match side {
        Direction::Forward => (this_path, other_path),
        Direction::Backward => (other_path, this_path),
    };
    from_begin
        .iter()
        .chain(from_end.iter().rev())
        .cloned()
        .collect()
}

/// Every single-character substitution of `word`, position first.
fn neighbours(word: &str, alphabet: &[char]) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut out = Vec::new();
    for pos in 0..chars.len() {
        for &ch in alphabet {
            if ch == chars[pos] {
                continue;
            }
            let mut candidate = chars.clone();
            candidate[pos] = ch;
            out.push(candidate.into_iter().collect());
        }
    }
    out
}

impl TraceGenerator for LadderSearch {
    type Instance = WordLadder;

    fn generate(&self, ladder: &WordLadder) -> Result<Trace> {
        let mut rec = Recorder::default();
        let mut forward = Side::new(&ladder.begin);
        let mut backward = Side::new(&ladder.end);
        let mut progress = Progress::default();

        let alphabet: Vec<char> = ladder
            .dictionary
            .iter()
            .chain([&ladder.begin, &ladder.end])
            .flat_map(|w| w.chars())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        rec.push(
            format!(
                "Searching from '{}' and '{}' at the same time over {} dictionary words",
                ladder.begin,
                ladder.end,
                ladder.dictionary.len()
            ),
            frame(
                Direction::Forward,
                forward.view(&forward.level, &[]),
                backward.view(&backward.level, &[]),
                Vec::new(),
                &progress,
                None,
            ),
        );

        let mut side = Direction::Forward;

        if ladder.begin == ladder.end {
            progress.meeting = Some(ladder.begin.clone());
            progress.best = Some(vec![ladder.begin.clone()]);
        }

        while progress.best.is_none() && !forward.level.is_empty() && !backward.level.is_empty() {
            let (this, other) = match side {
                Direction::Forward => (&mut forward, &backward),
                Direction::Backward => (&mut backward, &forward),
            };

            let current = std::mem::take(&mut this.level);
            let mut next: Vec<String> = Vec::new();

            for (i, word) in current.iter().enumerate() {
                let Some(path) = this.paths.get(word).cloned() else {
                    continue;
                };

                let mut rejected = Vec::new();
                let mut discovered = Vec::new();
                let mut meetings = Vec::new();

                for candidate in neighbours(word, &alphabet) {
                    if this.paths.contains_key(&candidate) {
                        rejected.push(Rejection {
                            word: candidate,
                            reason: RejectReason::AlreadyVisited,
                        });
                        continue;
                    }
                    if let Some(other_path) = other.paths.get(&candidate) {
                        let full = stitch(side, &path, other_path);
                        meetings.push((candidate, full));
                        continue;
                    }
                    if !ladder.dictionary.contains(&candidate) {
                        rejected.push(Rejection {
                            word: candidate,
                            reason: RejectReason::NotInDictionary,
                        });
                        continue;
                    }

                    let mut extended = path.clone();
                    extended.push(candidate.clone());
                    this.paths.insert(candidate.clone(), extended);
                    next.push(candidate.clone());
                    discovered.push(candidate);
                }

                let found_words = if discovered.is_empty() {
                    "nothing new".to_string()
                } else {
                    format!("discovered {}", discovered.join(", "))
                };
                rec.push(
                    format!(
                        "Expanding '{}' ({} side, depth {}): {}; {} candidates rejected",
                        word,
                        side,
                        path.len() - 1,
                        found_words,
                        rejected.len()
                    ),
                    frame(
                        side,
                        this.view(&current[i + 1..], &next),
                        other.view(&other.level, &[]),
                        rejected,
                        &progress,
                        None,
                    ),
                );

                for (point, full) in meetings {
                    let shorter = progress
                        .best
                        .as_ref()
                        .map_or(true, |best| full.len() < best.len());
                    let verdict = if shorter {
                        progress.best = Some(full.clone());
                        progress.meeting = Some(point.clone());
                        "new shortest ladder"
                    } else {
                        "not shorter than the best so far"
                    };
                    rec.push(
                        format!(
                            "Frontiers meet at '{}': {} ({} words), {}",
                            point,
                            full.join(" → "),
                            full.len(),
                            verdict
                        ),
                        frame(
                            side,
                            this.view(&current[i + 1..], &next),
                            other.view(&other.level, &[]),
                            Vec::new(),
                            &progress,
                            None,
                        ),
                    );
                }
                rec.within_budget()?;
            }

            this.level = next;
            progress.level += 1;
            if progress.best.is_none() {
                side = side.flip();
            }
        }

        let (description, found) = match &progress.best {
            Some(path) => (
                format!(
                    "Shortest ladder: {} ({} words)",
                    path.join(" → "),
                    path.len()
                ),
                true,
            ),
            None => (
                format!(
                    "No ladder connects '{}' to '{}'",
                    ladder.begin, ladder.end
                ),
                false,
            ),
        };
        rec.push(
            description,
            frame(
                Direction::Forward,
                forward.view(&forward.level, &[]),
                backward.view(&backward.level, &[]),
                Vec::new(),
                &progress,
                Some(found),
            ),
        );

        rec.finish()
    }
}

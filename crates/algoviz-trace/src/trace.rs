//! Immutable, non-empty step sequences.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{InvariantError, Result, ValidationError};
use crate::step::{Payload, Step};

/// Approximate memory a single trace may hold, in bytes.
pub const MAX_TRACE_BYTES: usize = 64 * 1024 * 1024;

/// The ordered output of one generator run.
///
/// Never empty: index 0 is the initial state and the last index is the
/// terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Step>", into = "Vec<Step>")]
pub struct Trace {
    steps: Vec<Step>,
}

impl Trace {
    /// Wrap recorded steps, rejecting an empty sequence.
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        if steps.is_empty() {
            return Err(InvariantError::EmptyTrace.into());
        }
        Ok(Self { steps })
    }

    /// Number of steps (always at least 1).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn initial(&self) -> &Step {
        &self.steps[0]
    }

    pub fn terminal(&self) -> &Step {
        &self.steps[self.steps.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}

impl Index<usize> for Trace {
    type Output = Step;

    fn index(&self, index: usize) -> &Step {
        &self.steps[index]
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl TryFrom<Vec<Step>> for Trace {
    type Error = InvariantError;

    fn try_from(steps: Vec<Step>) -> std::result::Result<Self, Self::Error> {
        if steps.is_empty() {
            return Err(InvariantError::EmptyTrace);
        }
        Ok(Self { steps })
    }
}

impl From<Trace> for Vec<Step> {
    fn from(trace: Trace) -> Self {
        trace.steps
    }
}

/// Accumulates steps while a generator runs.
///
/// Once the recorded footprint passes the budget, further steps are
/// dropped and [`finish`](Recorder::finish) fails. Generators whose step
/// count is not bounded by validation call
/// [`within_budget`](Recorder::within_budget) to stop early.
#[derive(Debug)]
pub(crate) struct Recorder {
    steps: Vec<Step>,
    bytes: usize,
    budget: usize,
    overflowed: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::with_budget(MAX_TRACE_BYTES)
    }
}

impl Recorder {
    pub(crate) fn with_budget(budget: usize) -> Self {
        Self {
            steps: Vec::new(),
            bytes: 0,
            budget,
            overflowed: false,
        }
    }

    pub(crate) fn push(&mut self, description: impl Into<String>, payload: Payload) {
        if self.overflowed {
            return;
        }
        let step = Step {
            description: description.into(),
            payload,
        };
        self.bytes += step.footprint();
        if self.bytes > self.budget {
            self.overflowed = true;
            return;
        }
        self.steps.push(step);
    }

    pub(crate) fn within_budget(&self) -> Result<()> {
        if self.overflowed {
            return Err(ValidationError::TraceTooLarge {
                steps: self.steps.len(),
                max_bytes: self.budget,
            }
            .into());
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<Trace> {
        self.within_budget()?;
        Trace::new(self.steps)
    }
}

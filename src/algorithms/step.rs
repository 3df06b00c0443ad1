use crate::grid::NodeId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    /// Looking for the first route to the target.
    Forward,
    /// Relaxing the remaining candidates that could tie the best route.
    Alternatives,
}

/// Snapshot taken after one node expansion, for whoever reports progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub phase: StepPhase,
    pub expanded: NodeId,
    pub frontier_len: usize,
    /// Frontier after the expansion, cheapest first. Empty unless the engine
    /// was built with detailed steps.
    pub frontier: Vec<NodeId>,
    pub visited: usize,
    pub passable: usize,
    /// Best known route from the start to the expanded node. Empty unless
    /// the engine was built with detailed steps.
    pub best_path: Vec<NodeId>,
    pub description: String,
}

impl Step {
    /// Share of passable nodes expanded so far.
    pub fn progress(&self) -> f64 {
        if self.passable == 0 {
            0.0
        } else {
            self.visited as f64 / self.passable as f64
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} (frontier {}, visited {}/{})",
            self.index,
            self.description,
            self.frontier_len,
            self.visited,
            self.passable
        )
    }
}

/// Outcome of a single call to `SearchEngine::step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub expanded_node: Option<NodeId>,
    pub is_target_settled: bool,
    pub is_exhausted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StepRecorder {
    steps: Vec<Step>,
}

impl StepRecorder {
    pub fn record(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn take(&mut self) -> Vec<Step> {
        std::mem::take(&mut self.steps)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}

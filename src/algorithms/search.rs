use crate::algorithms::alternatives::{self, PathForest};
use crate::algorithms::common::{Cost, Graph, Heuristic, INFINITE};
use crate::algorithms::frontier::Frontier;
use crate::algorithms::ledger::{CostLedger, NodeCost};
use crate::algorithms::step::{Step, StepPhase, StepRecorder, StepResult};
use crate::error::SearchError;
use crate::grid::NodeId;
use rustc_hash::FxHashSet;
use tracing::{debug, info, trace, warn};

/// Where the engine is in its prepare / search / alternatives protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Prepared,
    Searching,
    /// The target holds a finite cost.
    Settled,
    /// The frontier ran dry before the target was reached.
    Exhausted,
    AlternativesExpanded,
}

/// Bookkeeping owned by a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub ledger: CostLedger,
    pub frontier: Frontier,
    pub visited: FxHashSet<NodeId>,
    /// Passable neighbours of visited nodes that the searcher cannot see yet.
    pub fog: FxHashSet<NodeId>,
}

impl SearchState {
    fn clear(&mut self) {
        self.ledger.clear();
        self.frontier.clear();
        self.visited.clear();
        self.fog.clear();
    }
}

/// Best-first search over a partially known graph, with the cost estimate
/// supplied by the strategy `H`.
///
/// The engine borrows the graph for its whole lifetime, so the caller can
/// only change which nodes are known between runs, after dropping it.
///
/// A run can be driven in one call per phase (`find_shortest_path`, then
/// `find_alternative_paths`) or one expansion at a time with `step`; both
/// leave the engine in the same state.
pub struct SearchEngine<'g, G: Graph + ?Sized, H: Heuristic> {
    graph: &'g G,
    heuristic: H,
    state: SearchState,
    endpoints: Option<(NodeId, NodeId)>,
    phase: Phase,
    found: bool,
    explored: usize,
    passable: usize,
    max_paths: usize,
    detailed_steps: bool,
    recorder: StepRecorder,
}

impl<'g, G: Graph + ?Sized, H: Heuristic> SearchEngine<'g, G, H> {
    pub fn new(graph: &'g G, heuristic: H) -> Self {
        SearchEngine {
            graph,
            heuristic,
            state: SearchState::default(),
            endpoints: None,
            phase: Phase::Idle,
            found: false,
            explored: 0,
            passable: 0,
            max_paths: usize::MAX,
            detailed_steps: false,
            recorder: StepRecorder::default(),
        }
    }

    /// Caps how many tied paths `find_alternative_paths` collects.
    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths.max(1);
        self
    }

    /// Makes every recorded `Step` carry a frontier snapshot and the best
    /// known path to the expanded node. Off by default: both cost time and
    /// memory proportional to the search size on every expansion.
    pub fn with_step_detail(mut self, detailed: bool) -> Self {
        self.detailed_steps = detailed;
        self
    }

    /// Starts a fresh run from `start` towards `target`.
    ///
    /// # Arguments
    ///
    /// * `start` - The node the search expands first; it gets `g = 0` even when unknown.
    /// * `target` - The node whose cost the search settles.
    ///
    /// # Returns
    ///
    /// `Ok(())` with the engine in `Prepared`, or `InvalidArgument` when either
    /// endpoint is outside the graph or a passable node costs nothing to enter.
    pub fn prepare(&mut self, start: NodeId, target: NodeId) -> Result<(), SearchError> {
        for (role, node) in [("start", start), ("target", target)] {
            if !self.graph.contains(node) {
                return Err(SearchError::InvalidArgument {
                    role,
                    node,
                    reason: "is not part of the graph",
                });
            }
        }

        let mut passable = 0;
        for node in self.graph.nodes() {
            match self.graph.intrinsic_cost(node) {
                0 => {
                    return Err(SearchError::InvalidArgument {
                        role: "graph",
                        node,
                        reason: "has a zero entry cost",
                    })
                }
                INFINITE => {}
                _ => passable += 1,
            }
        }

        self.reset();
        self.passable = passable;
        self.state.ledger = CostLedger::prepare(self.graph, &self.heuristic, start, target);
        self.state
            .frontier
            .push(start, 0, self.state.ledger.heuristic(start));
        self.endpoints = Some((start, target));
        self.phase = Phase::Prepared;
        debug!(
            "{}: prepared search from {:?} to {:?}",
            self.heuristic.name(),
            self.graph.location(start),
            self.graph.location(target)
        );
        Ok(())
    }

    /// Expands the cheapest frontier node, unless the target is already
    /// settled or the frontier is empty.
    ///
    /// # Returns
    ///
    /// A `StepResult` naming the expanded node, if any, and whether the run
    /// has settled or exhausted. Once either flag is set further calls expand
    /// nothing, and `find_shortest_path` reports the same outcome.
    pub fn step(&mut self) -> Result<StepResult, SearchError> {
        let (start, target) = self.endpoints("step")?;
        match self.phase {
            Phase::Prepared | Phase::Searching => {}
            Phase::Settled => return Ok(self.idle_result(true, false)),
            Phase::Exhausted => return Ok(self.idle_result(false, true)),
            phase => {
                return Err(SearchError::InvalidPhase {
                    operation: "step",
                    phase,
                })
            }
        }

        if self.state.ledger.get(target).is_reached() {
            self.finish(Phase::Settled, start, target);
            return Ok(self.idle_result(true, false));
        }
        let Some(node) = self.state.frontier.pop_min() else {
            self.finish(Phase::Exhausted, start, target);
            return Ok(self.idle_result(false, true));
        };

        self.phase = Phase::Searching;
        self.expand(node);
        let description = format!("{}: Exploring {:?}", self.heuristic.name(), self.graph.location(node));
        self.record_step(StepPhase::Forward, node, description);

        let settled = self.state.ledger.get(target).is_reached();
        let exhausted = !settled && self.state.frontier.is_empty();
        if settled {
            self.finish(Phase::Settled, start, target);
        } else if exhausted {
            self.finish(Phase::Exhausted, start, target);
        }
        Ok(StepResult {
            expanded_node: Some(node),
            is_target_settled: settled,
            is_exhausted: exhausted,
        })
    }

    /// Runs the forward phase to completion.
    ///
    /// # Returns
    ///
    /// `true` when the target holds a finite cost and a visited node is
    /// adjacent to it (or the target is the start). Calling it again after
    /// the forward phase ended, by this method or by `step`, returns the
    /// recorded outcome without searching.
    pub fn find_shortest_path(&mut self) -> Result<bool, SearchError> {
        let (start, target) = self.endpoints("find the shortest path")?;
        match self.phase {
            Phase::Prepared | Phase::Searching => {}
            Phase::Settled | Phase::Exhausted => return Ok(self.found),
            phase => {
                return Err(SearchError::InvalidPhase {
                    operation: "find the shortest path",
                    phase,
                })
            }
        }

        if start != target && self.graph.is_known(target) && self.graph.intrinsic_cost(target) == INFINITE {
            warn!(
                "{}: target {:?} is known to be impassable",
                self.heuristic.name(),
                self.graph.location(target)
            );
            self.state.frontier.clear();
            self.phase = Phase::Exhausted;
            self.found = false;
            return Ok(false);
        }

        loop {
            let result = self.step()?;
            if result.is_target_settled || result.is_exhausted {
                break;
            }
        }
        Ok(self.found)
    }

    /// Keeps relaxing every frontier node that could still tie the target's
    /// cost, then collects all routes of that cost.
    ///
    /// # Returns
    ///
    /// The `PathForest` of tied routes, each running from start to target.
    /// `InvalidPhase` unless the forward phase succeeded; `InvariantViolation`
    /// when the ledger cannot be walked back to the start.
    pub fn find_alternative_paths(&mut self) -> Result<PathForest, SearchError> {
        let (start, target) = self.endpoints("find alternative paths")?;
        if self.phase != Phase::Settled || !self.found {
            return Err(SearchError::InvalidPhase {
                operation: "find alternative paths",
                phase: self.phase,
            });
        }

        while let Some(node) = self.state.frontier.peek_min() {
            let entry = self.state.ledger.get(node);
            if node == target || entry.f() > self.state.ledger.cost(target) {
                self.state.frontier.remove(node);
                continue;
            }

            self.state.frontier.pop_min();
            self.expand(node);
            let description = format!("{}: Looking for alternative paths", self.heuristic.name());
            self.record_step(StepPhase::Alternatives, node, description);
        }

        self.phase = Phase::AlternativesExpanded;
        alternatives::enumerate(self.graph, &self.state.ledger, start, target, self.max_paths)
    }

    /// Best known route from `from` to `to`, rebuilt by walking back from `to`
    /// over known, settled neighbours with the smallest `(f, g)` whose cost is
    /// lower than the current node's. A neighbour whose `g` plus the entry cost
    /// equals the current `g` is preferred, so the walk follows the ledger.
    ///
    /// # Arguments
    ///
    /// * `from` - First node of the returned path.
    /// * `to` - Last node of the returned path.
    ///
    /// # Returns
    ///
    /// The nodes from `from` to `to` inclusive, or `Unreachable` when either
    /// end has no finite cost or the walk cannot get back to `from`.
    pub fn get_path(&self, from: NodeId, to: NodeId) -> Result<Vec<NodeId>, SearchError> {
        self.endpoints("reconstruct a path")?;
        for (role, node) in [("start", from), ("target", to)] {
            if !self.graph.contains(node) {
                return Err(SearchError::InvalidArgument {
                    role,
                    node,
                    reason: "is not part of the graph",
                });
            }
        }

        let ledger = &self.state.ledger;
        if !ledger.get(from).is_reached() || !ledger.get(to).is_reached() {
            return Err(SearchError::Unreachable { from, to });
        }

        let mut path = vec![to];
        let mut node = to;
        while node != from {
            let g = ledger.cost(node);
            let entry_cost = self.graph.intrinsic_cost(node);
            let next = self
                .graph
                .neighbors(node)
                .into_iter()
                .filter(|&m| {
                    ledger.cost(m) < g
                        && (m == from || self.graph.is_known(m))
                        && !self.state.frontier.contains(m)
                })
                .min_by_key(|&m| {
                    let entry = ledger.get(m);
                    // Neighbours that actually relaxed `node` come first.
                    let relaxed_node = entry.g.saturating_add(entry_cost) == g;
                    (!relaxed_node, entry.f(), entry.g)
                });

            match next {
                Some(next) => {
                    path.push(next);
                    node = next;
                }
                None => return Err(SearchError::Unreachable { from, to }),
            }
        }

        path.reverse();
        Ok(path)
    }

    /// Drops all per-run state and returns to `Idle`.
    pub fn reset(&mut self) {
        self.state.clear();
        self.endpoints = None;
        self.phase = Phase::Idle;
        self.found = false;
        self.explored = 0;
        self.passable = 0;
        self.recorder.clear();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn node_cost(&self, node: NodeId) -> NodeCost {
        self.state.ledger.get(node)
    }

    pub fn cost(&self, node: NodeId) -> Cost {
        self.state.ledger.cost(node)
    }

    pub fn heuristic_of(&self, node: NodeId) -> Cost {
        self.state.ledger.heuristic(node)
    }

    /// Frontier snapshot, cheapest first.
    pub fn frontier(&self) -> Vec<NodeId> {
        self.state.frontier.iter().collect()
    }

    pub fn is_visited(&self, node: NodeId) -> bool {
        self.state.visited.contains(&node)
    }

    pub fn visited_count(&self) -> usize {
        self.state.visited.len()
    }

    /// Fog nodes seen so far, sorted by id.
    pub fn fog(&self) -> Vec<NodeId> {
        let mut fog: Vec<NodeId> = self.state.fog.iter().copied().collect();
        fog.sort_unstable();
        fog
    }

    /// Number of expansions in this run, both phases included.
    pub fn explored_count(&self) -> usize {
        self.explored
    }

    pub fn steps(&self) -> &[Step] {
        self.recorder.steps()
    }

    pub fn take_steps(&mut self) -> Vec<Step> {
        self.recorder.take()
    }

    fn endpoints(&self, operation: &'static str) -> Result<(NodeId, NodeId), SearchError> {
        self.endpoints.ok_or(SearchError::InvalidPhase {
            operation,
            phase: self.phase,
        })
    }

    fn idle_result(&self, is_target_settled: bool, is_exhausted: bool) -> StepResult {
        StepResult {
            expanded_node: None,
            is_target_settled,
            is_exhausted,
        }
    }

    /// Closes `node` and relaxes its known, passable, unvisited neighbours.
    fn expand(&mut self, node: NodeId) {
        self.state.visited.insert(node);
        self.explored += 1;
        let g_node = self.state.ledger.cost(node);

        for m in self.graph.neighbors(node) {
            let cost = self.graph.intrinsic_cost(m);
            if cost == INFINITE {
                continue;
            }
            if !self.graph.is_known(m) {
                if self.state.fog.insert(m) {
                    trace!("fog at {:?}", self.graph.location(m));
                }
                continue;
            }
            if self.state.visited.contains(&m) {
                continue;
            }

            let candidate = g_node.saturating_add(cost);
            let current = self.state.ledger.get(m);
            let relax = !current.is_reached() || candidate.saturating_add(current.h) < current.f();
            if relax {
                trace!(
                    "relax {:?}: g {} -> {}",
                    self.graph.location(m),
                    current.g,
                    candidate
                );
                self.state.ledger.set_cost(m, candidate);
            }
            if relax || !self.state.frontier.contains(m) {
                let entry = self.state.ledger.get(m);
                self.state.frontier.push(m, entry.g, entry.h);
            }
        }
    }

    /// Ends the forward phase. Success needs a visited node next to the
    /// target, or a target that is the start itself.
    fn finish(&mut self, phase: Phase, start: NodeId, target: NodeId) {
        self.phase = phase;
        self.found = phase == Phase::Settled
            && (start == target
                || self
                    .graph
                    .neighbors(target)
                    .iter()
                    .any(|n| self.state.visited.contains(n)));

        if self.found {
            info!(
                "{}: reached {:?} with cost {} after {} expansions",
                self.heuristic.name(),
                self.graph.location(target),
                self.state.ledger.cost(target),
                self.explored
            );
        } else {
            warn!(
                "{}: no known route to {:?} ({} fog nodes on the border)",
                self.heuristic.name(),
                self.graph.location(target),
                self.state.fog.len()
            );
        }
    }

    fn record_step(&mut self, phase: StepPhase, node: NodeId, description: String) {
        let (frontier, best_path) = match (self.detailed_steps, self.endpoints) {
            (true, Some((start, _))) => (
                self.frontier(),
                self.get_path(start, node).unwrap_or_default(),
            ),
            _ => (Vec::new(), Vec::new()),
        };
        let step = Step {
            index: self.recorder.len(),
            phase,
            expanded: node,
            frontier_len: self.state.frontier.len(),
            frontier,
            visited: self.state.visited.len(),
            passable: self.passable,
            best_path,
            description,
        };
        debug!("{}", step);
        self.recorder.record(step);
    }
}

use crate::algorithms::common::{Cost, Graph, INFINITE};
use crate::algorithms::ledger::CostLedger;
use crate::error::SearchError;
use crate::grid::NodeId;
use std::collections::VecDeque;
use tracing::{error, info};

/// Every route tied for the cheapest cost, each running start to target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathForest {
    pub paths: Vec<Vec<NodeId>>,
    /// Cost shared by all paths (the target's `g`).
    pub cost: Cost,
    /// Fewest nodes on any path.
    pub min_len: usize,
    /// Most nodes on any path.
    pub max_len: usize,
    pub count: usize,
    /// Enumeration stopped at the configured path cap.
    pub truncated: bool,
}

impl PathForest {
    fn new(paths: Vec<Vec<NodeId>>, cost: Cost, truncated: bool) -> Self {
        let min_len = paths.iter().map(Vec::len).min().unwrap_or(0);
        let max_len = paths.iter().map(Vec::len).max().unwrap_or(0);
        PathForest {
            count: paths.len(),
            paths,
            cost,
            min_len,
            max_len,
            truncated,
        }
    }

    /// The path the enumeration completed first.
    pub fn first(&self) -> Option<&[NodeId]> {
        self.paths.first().map(Vec::as_slice)
    }

    /// Where path `index` sits between the shortest (0.0) and the longest
    /// (1.0) path; 0.0 when all paths are equally long.
    pub fn length_weight(&self, index: usize) -> Option<f64> {
        let path = self.paths.get(index)?;
        if self.max_len == self.min_len {
            return Some(0.0);
        }
        Some((path.len() - self.min_len) as f64 / (self.max_len - self.min_len) as f64)
    }
}

/// Walks back from `target` to `start` over neighbours with the smallest `g`,
/// forking whenever several neighbours tie.
///
/// The ledger must be fully relaxed for every node that can lie on a tied
/// route; otherwise a dead end is reported as an invariant violation. Entry
/// costs are positive (`SearchEngine::prepare` rejects zero), so `g` drops
/// strictly along every walk and each walk ends.
pub(crate) fn enumerate<G: Graph + ?Sized>(
    graph: &G,
    ledger: &CostLedger,
    start: NodeId,
    target: NodeId,
    max_paths: usize,
) -> Result<PathForest, SearchError> {
    let cost = ledger.cost(target);
    if start == target {
        return Ok(PathForest::new(vec![vec![start]], cost, false));
    }

    let mut open: VecDeque<Vec<NodeId>> = VecDeque::from([vec![target]]);
    let mut closed: Vec<Vec<NodeId>> = Vec::new();
    let mut truncated = false;

    while !open.is_empty() {
        if closed.len() >= max_paths {
            truncated = true;
            break;
        }
        let Some(mut path) = open.pop_front() else {
            break;
        };
        let Some(&tail) = path.last() else {
            continue;
        };

        let predecessors = admissible_predecessors(graph, ledger, tail, start)?;
        let Some((&first, rest)) = predecessors.split_first() else {
            // admissible_predecessors never returns an empty list.
            continue;
        };

        for &other in rest {
            let mut branch = path.clone();
            branch.push(other);
            if other == start {
                closed.push(branch);
            } else {
                open.push_back(branch);
            }
        }

        path.push(first);
        if first == start {
            closed.push(path);
        } else {
            open.push_front(path);
        }
    }

    if closed.len() > max_paths {
        closed.truncate(max_paths);
        truncated = true;
    }
    for path in &mut closed {
        path.reverse();
    }

    let forest = PathForest::new(closed, cost, truncated);
    info!(
        "Found {} distinct paths with cost {}, ranging from {} to {} nodes{}",
        forest.count,
        forest.cost,
        forest.min_len,
        forest.max_len,
        if forest.truncated { " (truncated)" } else { "" }
    );
    Ok(forest)
}

/// Neighbours of `tail` holding the smallest finite `g`. When `start` is one
/// of them only `start` is returned, which closes the path.
fn admissible_predecessors<G: Graph + ?Sized>(
    graph: &G,
    ledger: &CostLedger,
    tail: NodeId,
    start: NodeId,
) -> Result<Vec<NodeId>, SearchError> {
    let neighbors = graph.neighbors(tail);
    let min = neighbors
        .iter()
        .map(|&n| ledger.cost(n))
        .filter(|&g| g != INFINITE)
        .min();

    let violation = |detail: String| {
        error!("Dead end while enumerating alternatives at node {}: {}", tail, detail);
        SearchError::InvariantViolation { node: tail, detail }
    };

    let Some(min) = min else {
        return Err(violation("no neighbour has a finite cost".to_string()));
    };
    if min >= ledger.cost(tail) {
        return Err(violation(format!(
            "cheapest neighbour cost {} does not undercut {}",
            min,
            ledger.cost(tail)
        )));
    }

    let admissible: Vec<NodeId> = neighbors
        .into_iter()
        .filter(|&n| ledger.cost(n) == min)
        .collect();
    if admissible.contains(&start) {
        return Ok(vec![start]);
    }
    Ok(admissible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::a_star::Manhattan;
    use crate::grid::Grid;

    fn ledger_with(grid: &Grid, start: NodeId, target: NodeId, costs: &[(NodeId, Cost)]) -> CostLedger {
        let mut ledger = CostLedger::prepare(grid, &Manhattan, start, target);
        for &(node, g) in costs {
            ledger.set_cost(node, g);
        }
        ledger
    }

    #[test]
    fn test_forks_on_tied_predecessors() {
        // 0 1
        // 2 3
        let grid = Grid::new(2, 2);
        let ledger = ledger_with(&grid, 0, 3, &[(1, 1), (2, 1), (3, 2)]);

        let forest = enumerate(&grid, &ledger, 0, 3, usize::MAX).unwrap();
        assert_eq!(forest.count, 2);
        assert_eq!(forest.paths, vec![vec![0, 1, 3], vec![0, 2, 3]]);
        assert_eq!((forest.min_len, forest.max_len), (3, 3));
        assert_eq!(forest.cost, 2);
        assert_eq!(forest.length_weight(1), Some(0.0));
    }

    #[test]
    fn test_cap_truncates_enumeration() {
        let grid = Grid::new(2, 2);
        let ledger = ledger_with(&grid, 0, 3, &[(1, 1), (2, 1), (3, 2)]);

        let forest = enumerate(&grid, &ledger, 0, 3, 1).unwrap();
        assert_eq!(forest.count, 1);
        assert!(forest.truncated);
    }

    #[test]
    fn test_dead_end_is_an_invariant_violation() {
        let grid = Grid::new(3, 1);
        // Middle node never relaxed: the walk from the target cannot continue.
        let ledger = ledger_with(&grid, 0, 2, &[(2, 2)]);

        let err = enumerate(&grid, &ledger, 0, 2, usize::MAX).unwrap_err();
        assert!(matches!(err, SearchError::InvariantViolation { node: 2, .. }));
    }

    #[test]
    fn test_start_equal_to_target_is_a_single_node_path() {
        let grid = Grid::new(1, 1);
        let ledger = ledger_with(&grid, 0, 0, &[]);
        let forest = enumerate(&grid, &ledger, 0, 0, usize::MAX).unwrap();
        assert_eq!(forest.paths, vec![vec![0]]);
        assert_eq!(forest.cost, 0);
    }
}

use crate::algorithms::common::{Cost, Graph, Heuristic, INFINITE};
use crate::grid::NodeId;

/// Accumulated cost from the start (`g`) and estimate to the target (`h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCost {
    pub g: Cost,
    pub h: Cost,
}

impl NodeCost {
    pub const UNREACHED: NodeCost = NodeCost {
        g: INFINITE,
        h: INFINITE,
    };

    pub fn f(&self) -> Cost {
        self.g.saturating_add(self.h)
    }

    pub fn is_reached(&self) -> bool {
        self.g != INFINITE
    }
}

/// Per-node `(g, h)` pairs for one run, indexed by node id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostLedger {
    entries: Vec<NodeCost>,
}

impl CostLedger {
    /// One entry per graph node: `g = 0` for `start`, unreached otherwise, and
    /// `h` fixed against `target` for the whole run.
    pub fn prepare<G, H>(graph: &G, heuristic: &H, start: NodeId, target: NodeId) -> Self
    where
        G: Graph + ?Sized,
        H: Heuristic + ?Sized,
    {
        let goal = graph.location(target);
        let entries = graph
            .nodes()
            .map(|node| NodeCost {
                g: if node == start { 0 } else { INFINITE },
                h: heuristic.estimate(graph.location(node), goal),
            })
            .collect();
        CostLedger { entries }
    }

    pub fn get(&self, node: NodeId) -> NodeCost {
        self.entries.get(node).copied().unwrap_or(NodeCost::UNREACHED)
    }

    pub fn cost(&self, node: NodeId) -> Cost {
        self.get(node).g
    }

    pub fn heuristic(&self, node: NodeId) -> Cost {
        self.get(node).h
    }

    pub fn set_cost(&mut self, node: NodeId, g: Cost) {
        if let Some(entry) = self.entries.get_mut(node) {
            entry.g = g;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Nodes that currently hold a finite `g`.
    pub fn reached(&self) -> impl Iterator<Item = (NodeId, NodeCost)> + '_ {
        self.entries
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, cost)| cost.is_reached())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::a_star::Manhattan;
    use crate::grid::Grid;

    #[test]
    fn test_prepare_seeds_start_and_static_heuristic() {
        let grid = Grid::new(3, 3);
        let ledger = CostLedger::prepare(&grid, &Manhattan, 0, 8);

        assert_eq!(ledger.len(), 9);
        assert_eq!(ledger.get(0), NodeCost { g: 0, h: 4 });
        assert_eq!(ledger.cost(4), INFINITE);
        assert_eq!(ledger.heuristic(4), 2);
        assert_eq!(ledger.heuristic(8), 0);
        assert_eq!(ledger.reached().count(), 1);
    }

    #[test]
    fn test_unknown_nodes_read_as_unreached() {
        let mut ledger = CostLedger::default();
        ledger.set_cost(3, 1);
        assert_eq!(ledger.get(3), NodeCost::UNREACHED);
        assert_eq!(NodeCost::UNREACHED.f(), INFINITE);
    }
}

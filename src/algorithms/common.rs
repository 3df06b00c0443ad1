use crate::grid::{EdgeId, NodeId, Position};

/// Path and terrain cost.
pub type Cost = u32;

/// Sentinel for "impassable" terrain and "not reached yet" ledger entries.
pub const INFINITE: Cost = Cost::MAX;

/// Read access the search needs from the map it runs on.
///
/// The graph must stay unchanged for the duration of a run. Only the caller
/// flips the "known" flags, and only between runs.
pub trait Graph {
    fn node_count(&self) -> usize;

    /// Up to four incident edges; absent directions are `None`.
    fn edges_of(&self, node: NodeId) -> [Option<EdgeId>; 4];

    fn other_endpoint(&self, edge: EdgeId, node: NodeId) -> Option<NodeId>;

    fn is_known(&self, node: NodeId) -> bool;

    /// Cost of entering `node`, `INFINITE` when impassable. Passable nodes must
    /// cost at least 1: the search rejects graphs with a zero entry cost.
    fn intrinsic_cost(&self, node: NodeId) -> Cost;

    fn location(&self, node: NodeId) -> Position;

    fn nodes(&self) -> std::ops::Range<NodeId> {
        0..self.node_count()
    }

    fn contains(&self, node: NodeId) -> bool {
        node < self.node_count()
    }

    /// Neighbours reached through the node's edges, in edge-slot order.
    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.edges_of(node)
            .into_iter()
            .flatten()
            .filter_map(|edge| self.other_endpoint(edge, node))
            .collect()
    }
}

/// Cost-to-go estimate supplied by a concrete search strategy.
///
/// Correct results need an estimate that is admissible and consistent with
/// the graph's costs.
pub trait Heuristic {
    fn name(&self) -> &'static str;

    fn estimate(&self, from: Position, to: Position) -> Cost;
}

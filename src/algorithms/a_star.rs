use crate::algorithms::common::{Cost, Graph, Heuristic};
use crate::algorithms::search::SearchEngine;
use crate::grid::Position;

/// Manhattan distance, admissible on a 4-connected grid whose cheapest
/// terrain costs 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manhattan;

impl Heuristic for Manhattan {
    fn name(&self) -> &'static str {
        "A*"
    }

    fn estimate(&self, from: Position, to: Position) -> Cost {
        Cost::try_from(from.manhattan(&to)).unwrap_or(Cost::MAX - 1)
    }
}

/// A* search over a partially known graph.
pub type AStar<'g, G> = SearchEngine<'g, G, Manhattan>;

impl<'g, G: Graph + ?Sized> SearchEngine<'g, G, Manhattan> {
    /// Creates an A* search guided by the Manhattan distance to the target.
    ///
    /// # Arguments
    ///
    /// * `graph` - The map to search; only its known nodes are entered.
    ///
    /// # Returns
    ///
    /// An idle engine, ready for `prepare`.
    pub fn a_star(graph: &'g G) -> Self {
        SearchEngine::new(graph, Manhattan)
    }
}

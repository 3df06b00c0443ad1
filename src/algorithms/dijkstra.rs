use crate::algorithms::common::{Cost, Graph, Heuristic};
use crate::algorithms::search::SearchEngine;
use crate::grid::Position;

/// No estimate at all: the search degrades to uniform-cost (Dijkstra).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zero;

impl Heuristic for Zero {
    fn name(&self) -> &'static str {
        "Dijkstra"
    }

    fn estimate(&self, _from: Position, _to: Position) -> Cost {
        0
    }
}

/// Dijkstra search over a partially known graph.
pub type Dijkstra<'g, G> = SearchEngine<'g, G, Zero>;

impl<'g, G: Graph + ?Sized> SearchEngine<'g, G, Zero> {
    /// Creates a uniform-cost search that expands nodes by `g` alone.
    ///
    /// # Arguments
    ///
    /// * `graph` - The map to search; only its known nodes are entered.
    ///
    /// # Returns
    ///
    /// An idle engine, ready for `prepare`.
    pub fn dijkstra(graph: &'g G) -> Self {
        SearchEngine::new(graph, Zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::a_star::AStar;
    use crate::grid::Grid;

    #[test]
    fn test_dijkstra_expands_at_least_as_much_as_a_star() {
        let mut grid = Grid::new(6, 6);
        grid.reveal_all();

        let mut uniform = Dijkstra::dijkstra(&grid);
        uniform.prepare(0, 35).unwrap();
        assert!(uniform.find_shortest_path().unwrap());

        let mut guided = AStar::a_star(&grid);
        guided.prepare(0, 35).unwrap();
        assert!(guided.find_shortest_path().unwrap());

        assert_eq!(uniform.cost(35), guided.cost(35));
        assert!(uniform.explored_count() >= guided.explored_count());
    }
}

use crate::grid::{Grid, NodeId, Position};

/// The explorer walking the map. It reveals everything within its sight
/// radius, which is how fog turns into known terrain between searches.
pub struct Agent {
    pub position: NodeId,
    pub sight_radius: usize,
}

impl Agent {
    pub fn new(start: NodeId, sight_radius: usize) -> Self {
        Agent {
            position: start,
            sight_radius,
        }
    }

    /// Marks the cells around the explorer as known. Returns how many were new.
    pub fn observe(&self, grid: &mut Grid) -> usize {
        grid.reveal_radius(self.position, self.sight_radius)
    }

    pub fn move_to(&mut self, node: NodeId) {
        self.position = node;
    }

    /// Corners of the square the explorer sees, clipped to the map.
    pub fn field_of_view_bounds(&self, grid: &Grid) -> Option<(Position, Position)> {
        let center = grid.node(self.position)?.position;
        let min = Position::new(
            center.x.saturating_sub(self.sight_radius),
            center.y.saturating_sub(self.sight_radius),
        );
        let max = Position::new(
            (center.x + self.sight_radius).min(grid.width - 1),
            (center.y + self.sight_radius).min(grid.height - 1),
        );
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Graph;

    #[test]
    fn test_observe_reveals_sight_square() {
        let mut grid = Grid::new(6, 6);
        let agent = Agent::new(grid.node_at(Position::new(1, 1)).unwrap(), 1);

        assert_eq!(agent.observe(&mut grid), 9);
        assert!(grid.is_known(grid.node_at(Position::new(2, 2)).unwrap()));
        assert!(!grid.is_known(grid.node_at(Position::new(3, 1)).unwrap()));
        assert_eq!(
            agent.field_of_view_bounds(&grid),
            Some((Position::new(0, 0), Position::new(2, 2)))
        );
    }
}

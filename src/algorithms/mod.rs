pub mod a_star;
pub mod alternatives;
pub mod common;
pub mod dijkstra;
pub mod frontier;
pub mod ledger;
pub mod search;
pub mod step;

pub use a_star::{AStar, Manhattan};
pub use alternatives::PathForest;
pub use common::{Cost, Graph, Heuristic, INFINITE};
pub use dijkstra::{Dijkstra, Zero};
pub use search::{Phase, SearchEngine, SearchState};
pub use step::{Step, StepPhase, StepResult};

use crate::grid::Position;

/// Strategy picked at runtime from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    AStar,
    Dijkstra,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::AStar, Strategy::Dijkstra];

    /// Name used on the command line and in CSV output.
    pub fn id(self) -> &'static str {
        match self {
            Strategy::AStar => "a_star",
            Strategy::Dijkstra => "dijkstra",
        }
    }
}

impl Heuristic for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::AStar => Manhattan.name(),
            Strategy::Dijkstra => Zero.name(),
        }
    }

    fn estimate(&self, from: Position, to: Position) -> Cost {
        match self {
            Strategy::AStar => Manhattan.estimate(from, to),
            Strategy::Dijkstra => Zero.estimate(from, to),
        }
    }
}

use crate::algorithms::search::Phase;
use crate::grid::NodeId;
use thiserror::Error;

/// Failures raised by the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A query the engine cannot answer: a start or target the graph does not
    /// contain, or a graph with a passable zero-cost node. The query should be
    /// rejected by the caller.
    #[error("{role} node {node} {reason}")]
    InvalidArgument {
        role: &'static str,
        node: NodeId,
        reason: &'static str,
    },

    /// Path reconstruction between nodes the ledger has no finite cost for.
    #[error("no known path from node {from} to node {to}")]
    Unreachable { from: NodeId, to: NodeId },

    /// The cost ledger disagrees with the graph. Not recoverable: the run
    /// must be abandoned instead of reporting a wrong path.
    #[error("search invariant violated at node {node}: {detail}")]
    InvariantViolation { node: NodeId, detail: String },

    /// An operation was called before the phase it depends on completed.
    #[error("cannot {operation} while the search is {phase:?}")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },
}

/// Problems in a map drawn as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,

    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph {
        glyph: char,
        row: usize,
        column: usize,
    },

    #[error("marker {glyph:?} appears more than once")]
    DuplicateMarker { glyph: char },
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("no passable route from start to goal after {attempts} generated maps")]
    NoPath { attempts: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to write results: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types shared by the engine, the search strategies and the facade.
use crate::search::{Algorithm, SearchStats};
use thiserror::Error;

/// Failures raised by board manipulation and the live game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The piece would stick out of the board when anchored at `(row, col)`.
    #[error("piece does not fit inside the board at ({row}, {col})")]
    OutOfBounds { row: usize, col: usize },
    /// A filled piece cell lands on an occupied or diamond cell.
    #[error("cell ({row}, {col}) is not empty")]
    Collision { row: usize, col: usize },
    /// The state has no piece to place (game over by score).
    #[error("no piece available to place")]
    NoPiece,
    #[error("not enough points to reroll (score {score}, cost {cost})")]
    RerollUnaffordable { score: i32, cost: i32 },
    #[error("difficulty must be between 1 and 4, got {0}")]
    InvalidDifficulty(u8),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Failures reported by the move selection facade.
///
/// A timeout is not an error: it surfaces as [`SearchError::NoSolutionFound`]
/// carrying the statistics gathered before the deadline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("algorithm {0} requires a heuristic")]
    MissingHeuristic(Algorithm),
    #[error("time limit must be a finite, non-negative number of seconds, got {0}")]
    InvalidTimeLimit(f64),
    #[error(
        "no solution found ({} nodes explored, max depth {})",
        stats.nodes_explored,
        stats.max_depth
    )]
    NoSolutionFound { stats: SearchStats },
    #[error("search algorithm failed: {0}")]
    AlgorithmError(String),
}

/// Failures that stop an autoplay run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutoplayError {
    /// The search could not be started (bad heuristic or time limit).
    #[error(transparent)]
    Search(#[from] SearchError),
    /// The game rejected a move the search suggested.
    #[error("suggested move rejected: {0}")]
    RejectedMove(#[from] EngineError),
}

//! Heuristic estimates for the informed strategies.
//!
//! Lower values mean "closer to a goal". Every heuristic reads the state
//! only; none of them draws pieces or touches the board it is given.
use crate::engine::Position;
use crate::state::{Move, State};

/// Value of [`diamond_proximity`] when no diamond or no placement is left.
pub const NO_DIAMOND_SENTINEL: f64 = 100.0;

/// A cost-to-go estimate. Closures `Fn(&State) -> f64` qualify as well.
pub trait Heuristic {
    fn estimate(&self, state: &State) -> f64;
}

impl<F> Heuristic for F
where
    F: Fn(&State) -> f64,
{
    fn estimate(&self, state: &State) -> f64 {
        self(state)
    }
}

/// The built-in heuristics, selectable by name from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum HeuristicKind {
    DiamondProximity,
    ScoreGain,
    Zero,
}

impl HeuristicKind {
    pub fn name(self) -> &'static str {
        match self {
            HeuristicKind::DiamondProximity => "diamond-proximity",
            HeuristicKind::ScoreGain => "score-gain",
            HeuristicKind::Zero => "zero",
        }
    }
}

impl Heuristic for HeuristicKind {
    fn estimate(&self, state: &State) -> f64 {
        match self {
            HeuristicKind::DiamondProximity => diamond_proximity(state),
            HeuristicKind::ScoreGain => score_gain(state),
            HeuristicKind::Zero => 0.0,
        }
    }
}

fn manhattan(a: Position, b: Position) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Smallest Manhattan distance between a filled cell of any legal placement
/// of the current piece and any diamond on the board.
///
/// [`NO_DIAMOND_SENTINEL`] is returned when the board holds no diamond or
/// the piece fits nowhere, so the value always stays finite and comparable.
pub fn diamond_proximity(state: &State) -> f64 {
    let diamonds = state.board().diamond_positions();
    let piece = match state.piece() {
        Some(piece) if !diamonds.is_empty() => piece,
        _ => return NO_DIAMOND_SENTINEL,
    };

    let mut best: Option<usize> = None;
    for (r, c) in state.possible_moves() {
        for (i, j) in piece.filled_cells() {
            for &diamond in &diamonds {
                let distance = manhattan((r + i, c + j), diamond);
                best = Some(best.map_or(distance, |b| b.min(distance)));
            }
        }
    }

    best.map_or(NO_DIAMOND_SENTINEL, |distance| distance as f64)
}

/// One-step lookahead on score: the negated best score change over all legal
/// placements of the current piece.
///
/// Gains below zero count as zero, so a state whose every move only pays
/// the placement penalty scores the same as one with no legal move (0).
pub fn score_gain(state: &State) -> f64 {
    let best_gain = state
        .possible_moves()
        .into_iter()
        .filter_map(|mv| state.simulate(mv).ok())
        .map(|report| report.score_delta)
        .fold(0, i32::max);
    -f64::from(best_gain)
}

/// First legal placement in row-major order. A hint helper, not an estimate.
pub fn first_available_move(state: &State) -> Option<Move> {
    let piece = state.piece()?;
    state.board().first_placement(piece)
}

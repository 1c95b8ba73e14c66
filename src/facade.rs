//! Move selection: the narrow entry point game front ends call.
//!
//! [`suggest_move`] turns a [`GameSnapshot`] into a root [`State`], runs one
//! strategy under a deadline and hands back the first move of the path it
//! found. Every failure comes back as a [`SearchError`]; a strategy that
//! panics is reported as [`SearchError::AlgorithmError`] instead of taking
//! the caller down.
use crate::config::SearchConfig;
use crate::engine::{Board, Difficulty, Game, Piece};
use crate::error::SearchError;
use crate::heuristics::Heuristic;
use crate::search::{Algorithm, Deadline, SearchContext, SearchStats};
use crate::state::{Move, State};
use log::{debug, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

/// Everything the search needs to know about a game in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    pub board: Board,
    /// `None` once the game is over by score.
    pub piece: Option<Piece>,
    pub score: i32,
    pub difficulty: Difficulty,
    pub diamonds_collected: usize,
    pub total_diamonds: usize,
}

impl GameSnapshot {
    /// The root state of a search from this snapshot.
    pub fn to_state(&self) -> State {
        State::root(
            self.board.clone(),
            self.piece.clone(),
            self.score,
            self.difficulty,
            self.diamonds_collected,
            self.total_diamonds,
        )
    }
}

impl Game {
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board().clone(),
            piece: (self.score() > 0).then(|| self.piece().clone()),
            score: self.score(),
            difficulty: self.difficulty(),
            diamonds_collected: self.diamonds_collected(),
            total_diamonds: self.total_diamonds(),
        }
    }
}

/// A successful move selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion {
    /// The move to play, or `None` when the snapshot already is a goal.
    pub mv: Option<Move>,
    /// Length of the path the strategy found.
    pub path_len: usize,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

/// Runs `algorithm` from `snapshot` for at most `time_limit_secs` seconds
/// and returns the first move of the path it finds.
///
/// # Errors
/// - `SearchError::MissingHeuristic` for an informed algorithm without a heuristic.
/// - `SearchError::InvalidTimeLimit` for a negative or non-finite limit.
/// - `SearchError::NoSolutionFound` when the strategy timed out or ran out of states.
/// - `SearchError::AlgorithmError` when the strategy panicked.
///
/// A caught panic still goes through the process panic hook, so the default
/// hook prints its message to stderr. Install a quiet hook with
/// [`std::panic::set_hook`] to suppress it.
///
/// # Examples
/// ```
/// use woodblock_solver::config::SearchConfig;
/// use woodblock_solver::engine::{Difficulty, Piece};
/// use woodblock_solver::facade::{suggest_move, GameSnapshot};
/// use woodblock_solver::search::Algorithm;
/// use woodblock_solver::utils::board_from_str_array;
///
/// let snapshot = GameSnapshot {
///     board: board_from_str_array(&[".##D", "....", "....", "...."]).unwrap(),
///     piece: Some(Piece::single()),
///     score: 100,
///     difficulty: Difficulty::EASY,
///     diamonds_collected: 0,
///     total_diamonds: 1,
/// };
/// let suggestion =
///     suggest_move(&snapshot, Algorithm::Bfs, 5.0, None, &SearchConfig::default()).unwrap();
/// assert_eq!(suggestion.mv, Some((0, 0)));
/// ```
pub fn suggest_move(
    snapshot: &GameSnapshot,
    algorithm: Algorithm,
    time_limit_secs: f64,
    heuristic: Option<&dyn Heuristic>,
    config: &SearchConfig,
) -> Result<Suggestion, SearchError> {
    let root = snapshot.to_state();
    let strategy = algorithm.build(config, heuristic)?;
    let deadline = Deadline::from_secs(time_limit_secs)?;
    let ctx = SearchContext::new(deadline, config.sampler());

    debug!(
        "{}: searching from score {} with {}/{} diamonds, limit {}s",
        algorithm,
        snapshot.score,
        snapshot.diamonds_collected,
        snapshot.total_diamonds,
        time_limit_secs
    );
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.search(root, &ctx)))
        .map_err(|payload| {
            let message = panic_message(payload.as_ref());
            warn!("{}: search aborted: {}", algorithm, message);
            SearchError::AlgorithmError(message)
        })?;
    let elapsed = ctx.deadline.elapsed();
    debug!(
        "{}: {:?} after {} nodes, max depth {}, {:?}",
        algorithm,
        outcome.termination,
        outcome.stats.nodes_explored,
        outcome.stats.max_depth,
        elapsed
    );

    match outcome.path {
        Some(path) => Ok(Suggestion {
            mv: path.first().copied(),
            path_len: path.len(),
            stats: outcome.stats,
            elapsed,
        }),
        None => Err(SearchError::NoSolutionFound {
            stats: outcome.stats,
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::HeuristicKind;
    use crate::utils::board_from_str_array;

    fn snapshot(rows: &[&str], score: i32) -> GameSnapshot {
        let board = board_from_str_array(rows).unwrap();
        let total_diamonds = board.count_diamonds();
        GameSnapshot {
            board,
            piece: Some(Piece::single()),
            score,
            difficulty: Difficulty::EASY,
            diamonds_collected: 0,
            total_diamonds,
        }
    }

    fn single_piece_config() -> SearchConfig {
        SearchConfig {
            fixed_piece: Some(Piece::single()),
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_single_move_scenario() {
        let snap = snapshot(&[".##D", "....", "....", "...."], 100);
        let suggestion =
            suggest_move(&snap, Algorithm::Bfs, 5.0, None, &SearchConfig::default()).unwrap();
        assert_eq!(suggestion.mv, Some((0, 0)));
        assert_eq!(suggestion.path_len, 1);
        assert_eq!(suggestion.stats.nodes_explored, 1);
        assert_eq!(suggestion.stats.max_depth, 1);
    }

    #[test]
    fn test_every_algorithm_suggests_a_move() {
        let snap = snapshot(&["D#..", "....", "....", "...."], 100);
        let heuristic = HeuristicKind::DiamondProximity;
        for algorithm in Algorithm::ALL {
            let suggestion = suggest_move(
                &snap,
                algorithm,
                5.0,
                Some(&heuristic),
                &single_piece_config(),
            )
            .unwrap();
            let mv = suggestion.mv.unwrap();
            assert!(
                mv == (0, 2) || mv == (0, 3) || algorithm == Algorithm::Greedy,
                "{} suggested {:?}",
                algorithm,
                mv
            );
            assert!(snap.board.can_place(&Piece::single(), mv.0, mv.1));
        }
    }

    #[test]
    fn test_goal_snapshot_needs_no_move() {
        let mut snap = snapshot(&["....", "....", "....", "...."], 50);
        snap.total_diamonds = 2;
        snap.diamonds_collected = 2;
        let suggestion =
            suggest_move(&snap, Algorithm::Ids, 1.0, None, &SearchConfig::default()).unwrap();
        assert_eq!(suggestion.mv, None);
        assert_eq!(suggestion.path_len, 0);
    }

    #[test]
    fn test_informed_without_heuristic() {
        let snap = snapshot(&["D#..", "....", "....", "...."], 100);
        for algorithm in [Algorithm::Greedy, Algorithm::Astar, Algorithm::Wastar] {
            let result = suggest_move(&snap, algorithm, 1.0, None, &SearchConfig::default());
            assert_eq!(result, Err(SearchError::MissingHeuristic(algorithm)));
        }
    }

    #[test]
    fn test_invalid_time_limit() {
        let snap = snapshot(&["D#..", "....", "....", "...."], 100);
        let config = SearchConfig::default();
        assert_eq!(
            suggest_move(&snap, Algorithm::Bfs, -2.0, None, &config),
            Err(SearchError::InvalidTimeLimit(-2.0))
        );
        assert!(matches!(
            suggest_move(&snap, Algorithm::Bfs, f64::NAN, None, &config),
            Err(SearchError::InvalidTimeLimit(_))
        ));
    }

    #[test]
    fn test_timeout_reports_no_solution() {
        let snap = snapshot(&["D#..", "....", "....", "...."], 100);
        let result = suggest_move(&snap, Algorithm::Ucs, 0.0, None, &SearchConfig::default());
        assert_eq!(
            result,
            Err(SearchError::NoSolutionFound {
                stats: SearchStats::default()
            })
        );
    }

    #[test]
    fn test_no_diamonds_reports_no_solution() {
        let snap = snapshot(&["....", "....", "....", "...."], 30);
        let result = suggest_move(&snap, Algorithm::Bfs, 5.0, None, &single_piece_config());
        match result {
            Err(SearchError::NoSolutionFound { stats }) => assert!(stats.nodes_explored > 0),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_panicking_heuristic_becomes_algorithm_error() {
        let snap = snapshot(&["D#..", "....", "....", "...."], 100);
        let faulty = |_: &State| -> f64 { panic!("heuristic blew up") };
        let result = suggest_move(
            &snap,
            Algorithm::Astar,
            1.0,
            Some(&faulty),
            &SearchConfig::default(),
        );
        match result {
            Err(SearchError::AlgorithmError(message)) => {
                assert!(message.contains("heuristic blew up"))
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_game_snapshot() {
        let board = board_from_str_array(&["D#..", "....", "..D.", "...."]).unwrap();
        let game = Game::from_parts(board.clone(), Piece::single(), 40, Difficulty::MEDIUM, 3);
        let snap = game.snapshot();
        assert_eq!(snap.board, board);
        assert_eq!(snap.piece, Some(Piece::single()));
        assert_eq!(snap.score, 40);
        assert_eq!(snap.difficulty, Difficulty::MEDIUM);
        assert_eq!((snap.diamonds_collected, snap.total_diamonds), (0, 2));

        let root = snap.to_state();
        assert_eq!(root.cost(), 0);
        assert_eq!(root.depth(), 0);
        assert_eq!(root.parent(), None);
        assert_eq!(root.last_move(), None);
    }
}

//! Lets one search strategy play a live [`Game`] on its own.
use crate::config::SearchConfig;
use crate::engine::{Game, GameOutcome};
use crate::error::{AutoplayError, SearchError};
use crate::facade::suggest_move;
use crate::heuristics::Heuristic;
use crate::search::{Algorithm, SearchStats};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Rerolls allowed in a row before the AI gives up on a stuck piece.
pub const MAX_CONSECUTIVE_REROLLS: u32 = 5;

/// How the AI should play.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoplayOptions {
    pub algorithm: Algorithm,
    /// Budget for each move's search, in seconds.
    pub time_limit_secs: f64,
    /// Stop after this many placements even if the game is still running.
    pub max_moves: Option<u32>,
}

/// Why an autoplay run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoplayEnd {
    /// The game itself ended.
    Finished(GameOutcome),
    /// The search found nothing to play and no reroll was left.
    AiStuck,
    MoveLimit,
}

/// Summary of an autoplay run.
#[derive(Clone, Debug, PartialEq)]
pub struct AutoplayReport {
    pub end: AutoplayEnd,
    pub moves: u32,
    pub rerolls: u32,
    pub final_score: i32,
    pub diamonds_collected: usize,
    pub total_diamonds: usize,
    /// Statistics summed over every search the run made.
    pub stats: SearchStats,
    pub elapsed: Duration,
}

/// Plays `game` until it ends, the AI gets stuck or the move limit is hit.
///
/// Before every move the game's outcome is checked. A piece that fits
/// nowhere, or for which the search finds no path, is rerolled, at most
/// [`MAX_CONSECUTIVE_REROLLS`] times in a row and only while the score stays
/// above the reroll cost.
///
/// # Errors
/// - `AutoplayError::Search` when the search cannot start at all
///   (missing heuristic, invalid time limit).
/// - `AutoplayError::RejectedMove` when the game refuses a suggested move.
pub fn play(
    game: &mut Game,
    options: &AutoplayOptions,
    heuristic: Option<&dyn Heuristic>,
    config: &SearchConfig,
) -> Result<AutoplayReport, AutoplayError> {
    let started = Instant::now();
    let mut moves = 0;
    let mut rerolls = 0;
    let mut consecutive_rerolls = 0;
    let mut stats = SearchStats::default();

    let end = loop {
        if let Some(outcome) = game.outcome() {
            if outcome != GameOutcome::NoMoves {
                break AutoplayEnd::Finished(outcome);
            }
            debug!("no legal placement for the current piece");
            if try_reroll(game, &mut consecutive_rerolls) {
                rerolls += 1;
                continue;
            }
            break AutoplayEnd::Finished(outcome);
        }
        if options.max_moves.is_some_and(|limit| moves >= limit) {
            break AutoplayEnd::MoveLimit;
        }

        let snapshot = game.snapshot();
        match suggest_move(
            &snapshot,
            options.algorithm,
            options.time_limit_secs,
            heuristic,
            config,
        ) {
            Ok(suggestion) => {
                stats.absorb(suggestion.stats);
                let Some((r, c)) = suggestion.mv else {
                    // Only a goal snapshot needs no move, and outcome() covers that.
                    break AutoplayEnd::AiStuck;
                };
                let report = game.place_piece(r, c)?;
                moves += 1;
                consecutive_rerolls = 0;
                info!(
                    "move {}: ({}, {}) score {:+} -> {}, diamonds {}/{}",
                    moves,
                    r,
                    c,
                    report.score_delta,
                    game.score(),
                    game.diamonds_collected(),
                    game.total_diamonds()
                );
            }
            Err(SearchError::NoSolutionFound { stats: partial }) => {
                stats.absorb(partial);
                debug!("{} found no path this turn", options.algorithm);
                if !try_reroll(game, &mut consecutive_rerolls) {
                    break AutoplayEnd::AiStuck;
                }
                rerolls += 1;
            }
            Err(SearchError::AlgorithmError(message)) => {
                warn!("{} failed: {}", options.algorithm, message);
                if !try_reroll(game, &mut consecutive_rerolls) {
                    break AutoplayEnd::AiStuck;
                }
                rerolls += 1;
            }
            Err(err) => return Err(err.into()),
        }
    };

    info!(
        "autoplay ended ({:?}) after {} moves and {} rerolls, score {}",
        end,
        moves,
        rerolls,
        game.score()
    );
    Ok(AutoplayReport {
        end,
        moves,
        rerolls,
        final_score: game.score(),
        diamonds_collected: game.diamonds_collected(),
        total_diamonds: game.total_diamonds(),
        stats,
        elapsed: started.elapsed(),
    })
}

/// Rerolls if the policy allows it; returns whether a new piece was drawn.
fn try_reroll(game: &mut Game, consecutive_rerolls: &mut u32) -> bool {
    let cost = game.difficulty().reroll_cost();
    if *consecutive_rerolls >= MAX_CONSECUTIVE_REROLLS {
        warn!("giving up after {} rerolls in a row", consecutive_rerolls);
        return false;
    }
    if game.score() <= cost {
        warn!("cannot reroll: score {} does not cover cost {}", game.score(), cost);
        return false;
    }
    match game.reroll() {
        Ok(()) => {
            *consecutive_rerolls += 1;
            debug!(
                "rerolled ({}/{}), score now {}",
                consecutive_rerolls,
                MAX_CONSECUTIVE_REROLLS,
                game.score()
            );
            true
        }
        Err(err) => {
            warn!("reroll refused: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Difficulty, Piece};
    use crate::heuristics::HeuristicKind;
    use crate::utils::board_from_str_array;

    fn game_from(rows: &[&str], score: i32) -> Game {
        let board = board_from_str_array(rows).unwrap();
        Game::from_parts(board, Piece::single(), score, Difficulty::EASY, 11)
    }

    fn options(algorithm: Algorithm, time_limit_secs: f64) -> AutoplayOptions {
        AutoplayOptions {
            algorithm,
            time_limit_secs,
            max_moves: None,
        }
    }

    #[test]
    fn test_plays_to_victory() {
        let mut game = game_from(&[".##D", "....", "....", "...."], 100);
        let report = play(
            &mut game,
            &options(Algorithm::Bfs, 5.0),
            None,
            &SearchConfig::default(),
        )
        .unwrap();
        assert_eq!(report.end, AutoplayEnd::Finished(GameOutcome::Victory));
        assert_eq!(report.moves, 1);
        assert_eq!(report.rerolls, 0);
        assert_eq!(report.final_score, 240);
        assert_eq!((report.diamonds_collected, report.total_diamonds), (1, 1));
        assert_eq!(report.stats.nodes_explored, 1);
    }

    #[test]
    fn test_stuck_piece_uses_reroll_budget() {
        let mut game = game_from(&["D#", "##"], 100);
        let report = play(
            &mut game,
            &options(Algorithm::Dfs, 1.0),
            None,
            &SearchConfig::default(),
        )
        .unwrap();
        assert_eq!(report.end, AutoplayEnd::Finished(GameOutcome::NoMoves));
        assert_eq!(report.rerolls, MAX_CONSECUTIVE_REROLLS);
        assert_eq!(report.final_score, 50);
        assert_eq!(report.moves, 0);
    }

    #[test]
    fn test_reroll_needs_score_above_cost() {
        let mut game = game_from(&["D#", "##"], 15);
        let report = play(
            &mut game,
            &options(Algorithm::Bfs, 1.0),
            None,
            &SearchConfig::default(),
        )
        .unwrap();
        assert_eq!(report.rerolls, 1);
        assert_eq!(report.final_score, 5);
        assert_eq!(report.end, AutoplayEnd::Finished(GameOutcome::NoMoves));
    }

    #[test]
    fn test_search_failures_trigger_rerolls() {
        let mut game = game_from(&["D#..", "....", "....", "...."], 100);
        let report = play(
            &mut game,
            &options(Algorithm::Ucs, 0.0),
            None,
            &SearchConfig::default(),
        )
        .unwrap();
        assert_eq!(report.end, AutoplayEnd::AiStuck);
        assert_eq!(report.rerolls, MAX_CONSECUTIVE_REROLLS);
        assert_eq!(report.moves, 0);
        assert_eq!(report.final_score, 50);
    }

    #[test]
    fn test_missing_heuristic_is_an_error() {
        let mut game = game_from(&["D#..", "....", "....", "...."], 100);
        let result = play(
            &mut game,
            &options(Algorithm::Greedy, 1.0),
            None,
            &SearchConfig::default(),
        );
        assert_eq!(
            result,
            Err(AutoplayError::Search(SearchError::MissingHeuristic(
                Algorithm::Greedy
            )))
        );
        assert_eq!(game.score(), 100);
    }

    #[test]
    fn test_move_limit() {
        let mut game = Game::new(Difficulty::MEDIUM, 5);
        let heuristic = HeuristicKind::DiamondProximity;
        let limited = AutoplayOptions {
            max_moves: Some(0),
            ..options(Algorithm::Greedy, 1.0)
        };
        let report = play(&mut game, &limited, Some(&heuristic), &SearchConfig::default()).unwrap();
        assert_eq!(report.end, AutoplayEnd::MoveLimit);
        assert_eq!(report.moves, 0);
        assert_eq!(report.final_score, Difficulty::MEDIUM.initial_score());
    }
}

//! # Wood Block Solver Library
//!
//! This library provides the game logic for a wood-block placement puzzle
//! (place pieces on a square grid, clear full rows and columns, collect every
//! diamond before the score runs out) together with a family of search
//! strategies that pick the next move.
//!
//! It is used by three binaries:
//! - `ai_solver`: Loads or generates a board, runs one search algorithm and
//!   prints the suggested move with search statistics.
//! - `ai_player`: Lets an algorithm play a whole game on its own.
//! - `algorithm_evaluator`: Runs every algorithm on a set of seeded boards
//!   and compares how they fare.
//!
//! ## Modules
//! - `engine`: Board cells (`Cell`), pieces and their difficulty-gated shape
//!   pools (`Piece`), the board (`Board`) with placement, clearing and scoring,
//!   and the live game (`Game`).
//! - `state`: Immutable search states, the transition function and the
//!   `SearchTree` arena used for path reconstruction.
//! - `search`: The `SearchStrategy` interface, the `Algorithm` tags and the
//!   blind (BFS, DFS, UCS, DLS, IDS) and informed (Greedy, A*, Weighted A*)
//!   strategies.
//! - `heuristics`: Cost-to-go estimates for the informed strategies.
//! - `facade`: `suggest_move`, the single entry point a front end calls.
//! - `autoplay`: Lets the AI play a `Game` until it ends.
//! - `config`: Search defaults and per-difficulty time limits.
//! - `error`: Error types.
//! - `utils`: Parsing boards and pieces from strings.

pub mod autoplay;
pub mod config;
pub mod engine;
pub mod error;
pub mod facade;
pub mod heuristics;
pub mod search;
pub mod state;
pub mod utils;

// Items are reached through their module path, e.g.
// `woodblock_solver::facade::suggest_move`.

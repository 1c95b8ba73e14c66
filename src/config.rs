//! Search parameters and their defaults.
use crate::engine::{Difficulty, Piece};
use crate::state::PieceSampler;

pub const DEFAULT_DLS_DEPTH_LIMIT: u32 = 10;
pub const DEFAULT_IDS_MAX_DEPTH: u32 = 50;
pub const DEFAULT_WASTAR_WEIGHT: f64 = 1.5;

/// Tunables shared by the facade, autoplay and the command-line tools.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Depth bound for depth-limited search, capped at [`crate::search::MAX_RECURSION_DEPTH`].
    pub dls_depth_limit: u32,
    /// Deepest iteration of iterative deepening, capped at [`crate::search::MAX_RECURSION_DEPTH`].
    pub ids_max_depth: u32,
    pub wastar_weight: f64,
    /// Seed for the pieces attached to successor states.
    pub seed: u64,
    /// When set, every successor receives this piece instead of a random draw.
    pub fixed_piece: Option<Piece>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            dls_depth_limit: DEFAULT_DLS_DEPTH_LIMIT,
            ids_max_depth: DEFAULT_IDS_MAX_DEPTH,
            wastar_weight: DEFAULT_WASTAR_WEIGHT,
            seed: 0,
            fixed_piece: None,
        }
    }
}

impl SearchConfig {
    /// The piece source a search call built from this configuration uses.
    pub fn sampler(&self) -> PieceSampler {
        match &self.fixed_piece {
            Some(piece) => PieceSampler::fixed(piece.clone()),
            None => PieceSampler::new(self.seed),
        }
    }
}

/// Seconds granted to a single hint request: `5 + difficulty`.
pub fn suggestion_time_limit(difficulty: Difficulty) -> f64 {
    5.0 + f64::from(difficulty.level())
}

/// Seconds granted per move when the AI plays alone: `5 + 2 * difficulty`.
pub fn play_time_limit(difficulty: Difficulty) -> f64 {
    5.0 + 2.0 * f64::from(difficulty.level())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.dls_depth_limit, 10);
        assert_eq!(config.ids_max_depth, 50);
        assert_eq!(config.wastar_weight, 1.5);
        assert_eq!(config.sampler(), PieceSampler::new(0));
    }

    #[test]
    fn test_time_limits_scale_with_difficulty() {
        assert_eq!(suggestion_time_limit(Difficulty::EASY), 6.0);
        assert_eq!(suggestion_time_limit(Difficulty::EXPERT), 9.0);
        assert_eq!(play_time_limit(Difficulty::EASY), 7.0);
        assert_eq!(play_time_limit(Difficulty::EXPERT), 13.0);
    }

    #[test]
    fn test_fixed_piece_sampler() {
        let config = SearchConfig {
            fixed_piece: Some(Piece::single()),
            seed: 42,
            ..SearchConfig::default()
        };
        assert_eq!(config.sampler(), PieceSampler::fixed(Piece::single()));
    }
}

//! Search states and the transition function.
//!
//! A [`State`] is an immutable snapshot of board, piece, score and
//! bookkeeping. States produced during a search live in a [`SearchTree`]
//! arena and refer to their parent through a [`StateId`] index, which is all
//! path reconstruction needs.
//!
//! Identity: two states are *equivalent* when their board, piece and score
//! are equal. Cost, depth and diamonds collected are deliberately left out,
//! so two paths of different length reaching the same board/piece/score are
//! deduplicated as one node. Every visited/explored structure in `search`
//! keys on [`StateKey`], which captures exactly these three fields. Do not
//! widen it to all fields: that changes which nodes the strategies prune.
use crate::engine::{Board, Difficulty, Piece, PlacementReport, Position};
use crate::error::EngineError;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Index;

/// A placement action: top-left anchor `(row, col)` of the current piece.
pub type Move = Position;

/// Every transition costs the same.
pub const MOVE_COST: u32 = 1;

/// Handle of a state stored in a [`SearchTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        StateId(index)
    }
}

/// The part of a state that defines its identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    board: Board,
    piece: Option<Piece>,
    score: i32,
}

/// Chooses the piece attached to a successor state.
///
/// The draw is seeded from the sampler's seed, the parent's identity and the
/// move, so a transition is a pure function of `(state, move)`: regenerating
/// a successor (as iterative deepening does) always yields the same piece,
/// and replaying a path reproduces the states found by the search.
///
/// A sampler built with [`PieceSampler::fixed`] hands out the same piece
/// every time, for puzzles whose piece stream is known in advance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PieceSampler {
    seed: u64,
    fixed: Option<Piece>,
}

impl PieceSampler {
    pub fn new(seed: u64) -> Self {
        PieceSampler { seed, fixed: None }
    }

    pub fn fixed(piece: Piece) -> Self {
        PieceSampler {
            seed: 0,
            fixed: Some(piece),
        }
    }

    /// Draws the next piece for the state reached from `parent` by `mv`.
    pub fn draw(&self, parent: &State, mv: Move) -> Piece {
        if let Some(piece) = &self.fixed {
            return piece.clone();
        }
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        parent.board.hash(&mut hasher);
        parent.piece.hash(&mut hasher);
        parent.score.hash(&mut hasher);
        mv.hash(&mut hasher);
        let mut rng = SmallRng::seed_from_u64(hasher.finish());
        Piece::random(parent.difficulty, &mut rng)
    }
}

/// One node of the state-transition graph.
#[derive(Clone, Debug)]
pub struct State {
    board: Board,
    piece: Option<Piece>,
    score: i32,
    difficulty: Difficulty,
    cost: u32,
    depth: u32,
    diamonds_collected: usize,
    total_diamonds: usize,
    parent: Option<StateId>,
    mv: Option<Move>,
}

impl State {
    /// Builds a root state (`cost = depth = 0`, no parent, no move).
    ///
    /// `diamonds_collected` is clamped to `total_diamonds`.
    pub fn root(
        board: Board,
        piece: Option<Piece>,
        score: i32,
        difficulty: Difficulty,
        diamonds_collected: usize,
        total_diamonds: usize,
    ) -> Self {
        State {
            board,
            piece,
            score,
            difficulty,
            cost: 0,
            depth: 0,
            diamonds_collected: diamonds_collected.min(total_diamonds),
            total_diamonds,
            parent: None,
            mv: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Cumulative action cost `g` from the root.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn diamonds_collected(&self) -> usize {
        self.diamonds_collected
    }

    pub fn total_diamonds(&self) -> usize {
        self.total_diamonds
    }

    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    /// The move that produced this state, `None` for a root.
    pub fn last_move(&self) -> Option<Move> {
        self.mv
    }

    /// The identity used for deduplication: `(board, piece, score)`.
    pub fn key(&self) -> StateKey {
        StateKey {
            board: self.board.clone(),
            piece: self.piece.clone(),
            score: self.score,
        }
    }

    pub fn is_equivalent(&self, other: &State) -> bool {
        self.board == other.board && self.piece == other.piece && self.score == other.score
    }

    /// All diamonds collected, and there was at least one to collect.
    pub fn is_goal(&self) -> bool {
        self.total_diamonds > 0 && self.diamonds_collected >= self.total_diamonds
    }

    /// Game over by score. A terminal state carries no piece.
    pub fn is_terminal(&self) -> bool {
        self.score <= 0
    }

    /// Every anchor where the current piece fits, row-major.
    pub fn possible_moves(&self) -> Vec<Move> {
        match &self.piece {
            Some(piece) => self.board.possible_placements(piece),
            None => Vec::new(),
        }
    }

    /// Simulates placing the current piece at `mv` on a scratch copy of the
    /// board and reports the clears and score delta. `self` is not modified
    /// and no piece is drawn.
    pub fn simulate(&self, mv: Move) -> Result<PlacementReport, EngineError> {
        let piece = self.piece.as_ref().ok_or(EngineError::NoPiece)?;
        let mut scratch = self.board.clone();
        scratch.apply_placement(piece, mv, self.difficulty)
    }

    /// The transition function.
    ///
    /// Validates and stamps the piece onto a private copy of the board,
    /// applies the placement penalty, clears full rows/columns and scores
    /// them, then attaches the next piece (or none once the score has
    /// dropped to zero or below). The child's `parent` is left unset; the
    /// [`SearchTree`] fills it in on insertion.
    ///
    /// # Errors
    /// `EngineError::OutOfBounds`, `EngineError::Collision` or
    /// `EngineError::NoPiece` when the placement is invalid.
    pub fn apply_move(&self, mv: Move, sampler: &PieceSampler) -> Result<State, EngineError> {
        let piece = self.piece.as_ref().ok_or(EngineError::NoPiece)?;
        let mut board = self.board.clone();
        let report = board.apply_placement(piece, mv, self.difficulty)?;

        let score = self.score.saturating_add(report.score_delta);
        let next_piece = if score > 0 {
            Some(sampler.draw(self, mv))
        } else {
            None
        };

        Ok(State {
            board,
            piece: next_piece,
            score,
            difficulty: self.difficulty,
            cost: self.cost + MOVE_COST,
            depth: self.depth + 1,
            diamonds_collected: (self.diamonds_collected + report.cleared.diamonds)
                .min(self.total_diamonds),
            total_diamonds: self.total_diamonds,
            parent: None,
            mv: Some(mv),
        })
    }

    /// `possible_moves` mapped through `apply_move`.
    pub fn successors(&self, sampler: &PieceSampler) -> Vec<State> {
        self.possible_moves()
            .into_iter()
            .filter_map(|mv| self.apply_move(mv, sampler).ok())
            .collect()
    }

    /// Applies `moves` one after the other starting from `self`.
    pub fn replay(&self, moves: &[Move], sampler: &PieceSampler) -> Result<State, EngineError> {
        let mut current = self.clone();
        for &mv in moves {
            current = current.apply_move(mv, sampler)?;
        }
        Ok(current)
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.is_equivalent(other)
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.board.hash(state);
        self.piece.hash(state);
        self.score.hash(state);
    }
}

/// Arena owning every state a strategy keeps during one search call.
#[derive(Debug, Default)]
pub struct SearchTree {
    nodes: Vec<State>,
}

impl SearchTree {
    pub fn new() -> Self {
        SearchTree::default()
    }

    /// Stores a root state.
    pub fn insert_root(&mut self, mut root: State) -> StateId {
        root.parent = None;
        self.push(root)
    }

    /// Stores `child` and links it to `parent`.
    pub fn insert_child(&mut self, parent: StateId, mut child: State) -> StateId {
        child.parent = Some(parent);
        self.push(child)
    }

    fn push(&mut self, state: State) -> StateId {
        let id = StateId(self.nodes.len());
        self.nodes.push(state);
        id
    }

    pub fn get(&self, id: StateId) -> &State {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Moves from the root to `id`, in the order they were applied.
    pub fn path(&self, id: StateId) -> Vec<Move> {
        let mut path = Vec::new();
        let mut current = self.get(id);
        while let (Some(parent), Some(mv)) = (current.parent, current.mv) {
            path.push(mv);
            current = self.get(parent);
        }
        path.reverse();
        path
    }
}

impl Index<StateId> for SearchTree {
    type Output = State;

    fn index(&self, id: StateId) -> &State {
        self.get(id)
    }
}

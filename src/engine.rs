//! Core game engine for the wood block puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Cell`: The three kinds of board cell (empty, occupied, diamond).
//! - `Piece`: A rectangular binary matrix of filled cells, plus the shape pools
//!   unlocked by each difficulty tier.
//! - `Difficulty`: The 1-4 tier that selects board size, scoring multipliers and shapes.
//! - `Board`: The square grid, with placement validation, stamping and
//!   simultaneous row/column clearing.
//! - `Game`: A live game session (board generation, placement, rerolls, outcome)
//!   used by the command-line front ends and by `autoplay`.
use crate::error::EngineError;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;

/// A `(row, column)` board coordinate. For a piece placement it is the
/// position of the piece's top-left corner.
pub type Position = (usize, usize);

/// Points subtracted for every piece placed.
pub const SCORE_PENALTY_PLACE_PIECE: i32 = 10;
/// Reroll cost per difficulty level.
pub const SCORE_PENALTY_REROLL_FACTOR: i32 = 10;
/// Points per cleared row or column, per difficulty level.
pub const SCORE_BASE_LINE_CLEAR: i32 = 50;
/// Points per captured diamond, per difficulty level.
pub const SCORE_DIAMOND_BONUS: i32 = 100;
/// Each extra line in a single clear earns `base / SCORE_COMBO_BONUS_DIVISOR`.
pub const SCORE_COMBO_BONUS_DIVISOR: i32 = 2;
/// Starting score per difficulty level.
pub const INITIAL_SCORE_FACTOR: i32 = 100;

/// Board side length is `BOARD_SIZE_BASE + difficulty`.
pub const BOARD_SIZE_BASE: usize = 3;
/// Largest board accepted from external input.
pub const MAX_BOARD_SIZE: usize = 16;

const DIAMOND_PERCENTAGE: f64 = 0.10;
const OBSTACLE_PERCENTAGE: f64 = 0.10;
const MIN_DIAMONDS: usize = 1;
const MIN_OBSTACLES: usize = 1;

/// Represents the content of a single board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Free space where a piece cell may land.
    Empty,
    /// Obstacle or previously placed block.
    Occupied,
    /// Collectible goal. Blocks placement, counts as filled for line clearing.
    Diamond,
}

impl Cell {
    /// Converts the cell to its character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use woodblock_solver::engine::Cell;
    /// assert_eq!(Cell::Diamond.to_char(), 'D');
    /// assert_eq!(Cell::Empty.to_char(), '.');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Occupied => '#',
            Cell::Diamond => 'D',
        }
    }

    /// Parses a cell character. A space is accepted as empty.
    pub fn from_char(ch: char) -> Option<Cell> {
        match ch {
            '.' | ' ' => Some(Cell::Empty),
            '#' => Some(Cell::Occupied),
            'D' => Some(Cell::Diamond),
            _ => None,
        }
    }

    /// A cell counts towards a full row/column when it is occupied or holds a diamond.
    pub fn is_filled(&self) -> bool {
        !matches!(self, Cell::Empty)
    }
}

/// Difficulty tier (1 = Easy .. 4 = Expert).
///
/// The tier selects the board size (`3 + tier`), scales the scoring constants
/// and unlocks larger piece shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const EASY: Difficulty = Difficulty(1);
    pub const MEDIUM: Difficulty = Difficulty(2);
    pub const HARD: Difficulty = Difficulty(3);
    pub const EXPERT: Difficulty = Difficulty(4);

    /// Validates a difficulty level.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidDifficulty` when `level` is outside `1..=4`.
    pub fn new(level: u8) -> Result<Self, EngineError> {
        if (1..=4).contains(&level) {
            Ok(Difficulty(level))
        } else {
            Err(EngineError::InvalidDifficulty(level))
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn board_size(self) -> usize {
        BOARD_SIZE_BASE + self.0 as usize
    }

    pub fn line_clear_points(self) -> i32 {
        SCORE_BASE_LINE_CLEAR * i32::from(self.0)
    }

    pub fn diamond_bonus(self) -> i32 {
        SCORE_DIAMOND_BONUS * i32::from(self.0)
    }

    pub fn reroll_cost(self) -> i32 {
        SCORE_PENALTY_REROLL_FACTOR * i32::from(self.0)
    }

    pub fn initial_score(self) -> i32 {
        INITIAL_SCORE_FACTOR * i32::from(self.0)
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "Easy",
            2 => "Medium",
            3 => "Hard",
            _ => "Expert",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::EASY
    }
}

type Shape = &'static [&'static [u8]];

const BASIC_SHAPES: [Shape; 4] = [&[&[1, 1]], &[&[1], &[1]], &[&[1, 1, 1]], &[&[1], &[1], &[1]]];

// Available from difficulty 2.
const MEDIUM_SHAPES: [Shape; 4] = [
    &[&[1, 1], &[1, 1]],
    &[&[1, 1], &[1, 0]],
    &[&[1, 1], &[0, 1]],
    &[&[1, 0], &[1, 1]],
];

// Available from difficulty 3.
const HARD_SHAPES: [Shape; 3] = [
    &[&[1, 1, 1], &[1, 0, 0]],
    &[&[1, 1, 1], &[0, 0, 1]],
    &[&[1, 0], &[1, 0], &[1, 1]],
];

// Difficulty 4 only.
const EXPERT_SHAPES: [Shape; 3] = [
    &[&[1, 1, 1], &[0, 1, 0]],
    &[&[0, 1, 0], &[1, 1, 1]],
    &[&[1, 1, 0], &[0, 1, 1]],
];

fn shape_pool(difficulty: Difficulty) -> Vec<Shape> {
    let mut pool: Vec<Shape> = BASIC_SHAPES.to_vec();
    if difficulty >= Difficulty::MEDIUM {
        pool.extend_from_slice(&MEDIUM_SHAPES);
    }
    if difficulty >= Difficulty::HARD {
        pool.extend_from_slice(&HARD_SHAPES);
    }
    if difficulty >= Difficulty::EXPERT {
        pool.extend_from_slice(&EXPERT_SHAPES);
    }
    pool
}

/// A piece: a rectangular binary matrix where `true` marks a filled cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    height: usize,
    width: usize,
    cells: Vec<bool>,
}

impl Piece {
    /// Builds a piece from rows of `0`/`1` values.
    ///
    /// # Errors
    /// Returns `EngineError::Parse` if the matrix is empty, ragged, or has no filled cell.
    ///
    /// # Examples
    /// ```
    /// use woodblock_solver::engine::Piece;
    /// let l_shape = Piece::from_rows(&[&[1, 1], &[1, 0]]).unwrap();
    /// assert_eq!(l_shape.filled_cells().count(), 3);
    /// assert!(Piece::from_rows(&[&[1, 1], &[1]]).is_err());
    /// ```
    pub fn from_rows(rows: &[&[u8]]) -> Result<Self, EngineError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        if height == 0 || width == 0 {
            return Err(EngineError::Parse("piece must have at least one row and column".into()));
        }
        if rows.iter().any(|row| row.len() != width) {
            return Err(EngineError::Parse("piece rows must all have the same length".into()));
        }
        let cells: Vec<bool> = rows.iter().flat_map(|row| row.iter().map(|&v| v != 0)).collect();
        if !cells.iter().any(|&filled| filled) {
            return Err(EngineError::Parse("piece must have at least one filled cell".into()));
        }
        Ok(Piece { height, width, cells })
    }

    /// The 1x1 piece.
    pub fn single() -> Self {
        Piece {
            height: 1,
            width: 1,
            cells: vec![true],
        }
    }

    // Pool shapes are known to be well formed.
    fn from_shape(shape: Shape) -> Self {
        Piece {
            height: shape.len(),
            width: shape[0].len(),
            cells: shape.iter().flat_map(|row| row.iter().map(|&v| v != 0)).collect(),
        }
    }

    /// Draws a random piece from the shape pool unlocked at `difficulty`.
    pub fn random(difficulty: Difficulty, rng: &mut impl Rng) -> Self {
        let pool = shape_pool(difficulty);
        let shape = pool[rng.gen_range(0..pool.len())];
        Piece::from_shape(shape)
    }

    /// Every shape a piece drawn at `difficulty` may take.
    pub fn pool(difficulty: Difficulty) -> Vec<Piece> {
        shape_pool(difficulty).into_iter().map(Piece::from_shape).collect()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_filled(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.width + j]
    }

    /// Offsets `(i, j)` of the filled cells, in row-major order.
    pub fn filled_cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height)
            .flat_map(move |i| (0..self.width).map(move |j| (i, j)))
            .filter(move |&(i, j)| self.is_filled(i, j))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.height {
            let row: String = (0..self.width)
                .map(|j| if self.is_filled(i, j) { '#' } else { '.' })
                .collect();
            if i + 1 < self.height {
                writeln!(f, "{}", row)?;
            } else {
                write!(f, "{}", row)?;
            }
        }
        Ok(())
    }
}

/// Lines removed by a single placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub rows: usize,
    pub cols: usize,
    /// Diamonds among the cleared cells; a cell in both a cleared row and a
    /// cleared column counts once.
    pub diamonds: usize,
}

impl ClearReport {
    pub fn lines(&self) -> usize {
        self.rows + self.cols
    }

    /// Points earned by this clear at the given difficulty:
    /// `lines * base + max(0, lines - 1) * base / 2 + diamonds * diamondBonus`.
    ///
    /// # Examples
    /// ```
    /// use woodblock_solver::engine::{ClearReport, Difficulty};
    /// let double = ClearReport { rows: 1, cols: 1, diamonds: 1 };
    /// // 2 * 50 + 1 * 50 / 2 + 1 * 100
    /// assert_eq!(double.points(Difficulty::EASY), 225);
    /// ```
    pub fn points(&self, difficulty: Difficulty) -> i32 {
        let lines = self.lines() as i32;
        let base = difficulty.line_clear_points();
        let combo = (lines - 1).max(0) * base / SCORE_COMBO_BONUS_DIVISOR;
        lines * base + combo + self.diamonds as i32 * difficulty.diamond_bonus()
    }
}

/// Result of placing a piece and resolving the clears it causes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementReport {
    pub position: Position,
    pub cleared: ClearReport,
    /// Placement penalty plus clear points.
    pub score_delta: i32,
}

/// Represents the game board as a square grid of `Cell`s.
///
/// Cells are stored row-major. The board derives `Hash`/`Eq` so it can take
/// part in the search's state equivalence key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty `size` x `size` board.
    ///
    /// # Examples
    /// ```
    /// use woodblock_solver::engine::{Board, Cell};
    /// let board = Board::new_empty(4);
    /// assert_eq!(board.size(), 4);
    /// assert_eq!(board.get_cell(3, 3), Cell::Empty);
    /// ```
    pub fn new_empty(size: usize) -> Self {
        Board {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Generates a starting board for `difficulty`: 10% of the cells (at least
    /// one) become diamonds and another 10% (at least one) become obstacles, on
    /// shuffled coordinates.
    pub fn new_random(difficulty: Difficulty, rng: &mut impl Rng) -> Self {
        let size = difficulty.board_size();
        let total_cells = size * size;
        let num_diamonds = MIN_DIAMONDS.max((DIAMOND_PERCENTAGE * total_cells as f64) as usize);
        let mut num_obstacles =
            MIN_OBSTACLES.max((OBSTACLE_PERCENTAGE * total_cells as f64) as usize);
        if num_diamonds + num_obstacles >= total_cells {
            num_obstacles = total_cells.saturating_sub(num_diamonds + 1);
        }

        let mut coords: Vec<Position> = (0..size)
            .flat_map(|r| (0..size).map(move |c| (r, c)))
            .collect();
        coords.shuffle(rng);

        let mut board = Board::new_empty(size);
        let mut iter = coords.into_iter();
        for (r, c) in iter.by_ref().take(num_diamonds) {
            board.set_cell(r, c, Cell::Diamond);
        }
        for (r, c) in iter.take(num_obstacles) {
            board.set_cell(r, c, Cell::Occupied);
        }
        board
    }

    /// Creates a board from rows of cells.
    ///
    /// # Errors
    /// Returns `EngineError::Parse` when the grid is empty, not square, or
    /// larger than `MAX_BOARD_SIZE`.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, EngineError> {
        let size = rows.len();
        if size == 0 || size > MAX_BOARD_SIZE {
            return Err(EngineError::Parse(format!(
                "board must have between 1 and {} rows, found {}",
                MAX_BOARD_SIZE, size
            )));
        }
        if let Some((r, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(EngineError::Parse(format!(
                "board must be square: row {} has {} cells, expected {}",
                r,
                row.len(),
                size
            )));
        }
        Ok(Board {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the cell at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if `r` or `c` is outside the board.
    pub fn get_cell(&self, r: usize, c: usize) -> Cell {
        assert!(r < self.size && c < self.size, "({}, {}) outside board", r, c);
        self.cells[r * self.size + c]
    }

    /// # Panics
    /// Panics if `r` or `c` is outside the board.
    pub fn set_cell(&mut self, r: usize, c: usize, cell: Cell) {
        assert!(r < self.size && c < self.size, "({}, {}) outside board", r, c);
        self.cells[r * self.size + c] = cell;
    }

    /// Validates anchoring `piece` with its top-left corner at `(r, c)`.
    ///
    /// The piece must lie entirely inside the board and every filled piece
    /// cell must land on an `Empty` cell. Obstacles, placed blocks and
    /// diamonds all block.
    pub fn check_placement(&self, piece: &Piece, r: usize, c: usize) -> Result<(), EngineError> {
        if r >= self.size
            || c >= self.size
            || piece.height() > self.size - r
            || piece.width() > self.size - c
        {
            return Err(EngineError::OutOfBounds { row: r, col: c });
        }
        match piece
            .filled_cells()
            .map(|(i, j)| (r + i, c + j))
            .find(|&(br, bc)| self.get_cell(br, bc) != Cell::Empty)
        {
            Some((row, col)) => Err(EngineError::Collision { row, col }),
            None => Ok(()),
        }
    }

    pub fn can_place(&self, piece: &Piece, r: usize, c: usize) -> bool {
        self.check_placement(piece, r, c).is_ok()
    }

    /// Stamps `piece` onto the board; its filled cells become `Occupied`.
    pub fn place_piece(&mut self, piece: &Piece, r: usize, c: usize) -> Result<(), EngineError> {
        self.check_placement(piece, r, c)?;
        for (i, j) in piece.filled_cells() {
            self.set_cell(r + i, c + j, Cell::Occupied);
        }
        Ok(())
    }

    /// Clears every full row and column simultaneously.
    ///
    /// Fullness is decided before anything is cleared, so a cell lying in both
    /// a full row and a full column is cleared (and its diamond counted) once.
    pub fn clear_full_lines(&mut self) -> ClearReport {
        let n = self.size;
        let full_rows: Vec<usize> = (0..n)
            .filter(|&r| (0..n).all(|c| self.get_cell(r, c).is_filled()))
            .collect();
        let full_cols: Vec<usize> = (0..n)
            .filter(|&c| (0..n).all(|r| self.get_cell(r, c).is_filled()))
            .collect();

        let mut diamonds = 0;
        let row_cells = full_rows.iter().flat_map(|&r| (0..n).map(move |c| (r, c)));
        let col_cells = full_cols.iter().flat_map(|&c| (0..n).map(move |r| (r, c)));
        for (r, c) in row_cells.chain(col_cells) {
            if self.get_cell(r, c) == Cell::Diamond {
                diamonds += 1;
            }
            self.set_cell(r, c, Cell::Empty);
        }

        ClearReport {
            rows: full_rows.len(),
            cols: full_cols.len(),
            diamonds,
        }
    }

    /// Places `piece` at `pos`, applies the placement penalty and resolves
    /// line clears. The board is left untouched when the placement is invalid.
    pub fn apply_placement(
        &mut self,
        piece: &Piece,
        pos: Position,
        difficulty: Difficulty,
    ) -> Result<PlacementReport, EngineError> {
        self.place_piece(piece, pos.0, pos.1)?;
        let cleared = self.clear_full_lines();
        Ok(PlacementReport {
            position: pos,
            cleared,
            score_delta: cleared.points(difficulty) - SCORE_PENALTY_PLACE_PIECE,
        })
    }

    /// Every anchor where `piece` fits, in row-major order.
    pub fn possible_placements(&self, piece: &Piece) -> Vec<Position> {
        self.anchors(piece)
            .filter(|&(r, c)| self.can_place(piece, r, c))
            .collect()
    }

    /// The first anchor (row-major) where `piece` fits.
    pub fn first_placement(&self, piece: &Piece) -> Option<Position> {
        self.anchors(piece).find(|&(r, c)| self.can_place(piece, r, c))
    }

    // Anchors keeping the piece's bounding box inside the board.
    fn anchors(&self, piece: &Piece) -> impl Iterator<Item = Position> {
        let rows = (self.size + 1).saturating_sub(piece.height());
        let cols = (self.size + 1).saturating_sub(piece.width());
        (0..rows).flat_map(move |r| (0..cols).map(move |c| (r, c)))
    }

    pub fn diamond_positions(&self) -> Vec<Position> {
        (0..self.size)
            .flat_map(|r| (0..self.size).map(move |c| (r, c)))
            .filter(|&(r, c)| self.get_cell(r, c) == Cell::Diamond)
            .collect()
    }

    pub fn count_diamonds(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == Cell::Diamond).count()
    }

    /// Renders the board with row/column numbers. When `overlay` is given, the
    /// cells the piece would cover are drawn as `+`.
    pub fn to_string_with_piece(&self, overlay: Option<(&Piece, Position)>) -> String {
        let covered: Vec<Position> = overlay
            .map(|(piece, (r, c))| piece.filled_cells().map(|(i, j)| (r + i, c + j)).collect())
            .unwrap_or_default();

        let mut output = String::from("  ");
        for c in 0..self.size {
            output.push_str(&format!("{:<2}", c));
        }
        for r in 0..self.size {
            output.push('\n');
            output.push_str(&format!("{:<2}", r));
            for c in 0..self.size {
                let ch = if covered.contains(&(r, c)) {
                    '+'
                } else {
                    self.get_cell(r, c).to_char()
                };
                output.push(ch);
                output.push(' ');
            }
        }
        output
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_piece(None))
    }
}

/// Why a game has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    /// Every diamond on the starting board was collected.
    Victory,
    /// Score dropped to zero or below.
    OutOfScore,
    /// Score is positive but the current piece fits nowhere.
    NoMoves,
}

/// A live game session.
///
/// Unlike the search `State`, a `Game` is mutated in place: placing a piece
/// updates the board, score and diamond count and always draws a fresh piece.
///
/// # Examples
/// ```
/// use woodblock_solver::engine::{Difficulty, Game};
/// let mut game = Game::new(Difficulty::EASY, 7);
/// assert_eq!(game.board().size(), 4);
/// assert_eq!(game.score(), 100);
/// if let Some(pos) = game.board().first_placement(game.piece()) {
///     let report = game.place_piece(pos.0, pos.1).unwrap();
///     assert_eq!(game.score(), 100 + report.score_delta);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    piece: Piece,
    score: i32,
    difficulty: Difficulty,
    diamonds_collected: usize,
    total_diamonds: usize,
    steps: u32,
    rng: SmallRng,
}

impl Game {
    /// Creates a game with a generated board; `seed` drives both the board
    /// layout and every piece drawn afterwards.
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = Board::new_random(difficulty, &mut rng);
        let piece = Piece::random(difficulty, &mut rng);
        Game::assemble(board, piece, difficulty.initial_score(), difficulty, rng)
    }

    /// Creates a game from a fixed board and piece.
    pub fn from_parts(
        board: Board,
        piece: Piece,
        score: i32,
        difficulty: Difficulty,
        seed: u64,
    ) -> Self {
        Game::assemble(board, piece, score, difficulty, SmallRng::seed_from_u64(seed))
    }

    fn assemble(
        board: Board,
        piece: Piece,
        score: i32,
        difficulty: Difficulty,
        rng: SmallRng,
    ) -> Self {
        let total_diamonds = board.count_diamonds();
        Game {
            board,
            piece,
            score,
            difficulty,
            diamonds_collected: 0,
            total_diamonds,
            steps: 0,
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn diamonds_collected(&self) -> usize {
        self.diamonds_collected
    }

    pub fn total_diamonds(&self) -> usize {
        self.total_diamonds
    }

    /// Number of pieces placed so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Places the current piece with its top-left corner at `(r, c)`.
    ///
    /// On success the board, score and diamond count are updated, a new piece
    /// is drawn and the placement report is returned. On failure nothing changes.
    pub fn place_piece(&mut self, r: usize, c: usize) -> Result<PlacementReport, EngineError> {
        let report = self
            .board
            .apply_placement(&self.piece, (r, c), self.difficulty)?;
        self.score = self.score.saturating_add(report.score_delta);
        self.diamonds_collected += report.cleared.diamonds;
        self.steps += 1;
        self.piece = Piece::random(self.difficulty, &mut self.rng);
        Ok(report)
    }

    /// Swaps the current piece for a new random one at a cost of
    /// `10 * difficulty` points.
    ///
    /// # Errors
    /// `EngineError::RerollUnaffordable` when the score is below the cost.
    pub fn reroll(&mut self) -> Result<(), EngineError> {
        let cost = self.difficulty.reroll_cost();
        if self.score < cost {
            return Err(EngineError::RerollUnaffordable {
                score: self.score,
                cost,
            });
        }
        self.score -= cost;
        self.piece = Piece::random(self.difficulty, &mut self.rng);
        Ok(())
    }

    pub fn has_valid_moves(&self) -> bool {
        self.board.first_placement(&self.piece).is_some()
    }

    /// Returns the outcome if the game has ended, `None` while it is still running.
    pub fn outcome(&self) -> Option<GameOutcome> {
        if self.total_diamonds > 0 && self.diamonds_collected >= self.total_diamonds {
            Some(GameOutcome::Victory)
        } else if self.score <= 0 {
            Some(GameOutcome::OutOfScore)
        } else if !self.has_valid_moves() {
            Some(GameOutcome::NoMoves)
        } else {
            None
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Difficulty: {} | Score: {} | Diamonds: {}/{}",
            self.difficulty.name(),
            self.score,
            self.diamonds_collected,
            self.total_diamonds
        )?;
        writeln!(f, "{}", self.board)?;
        write!(f, "Piece:\n{}", self.piece)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

    #[test]
    fn test_new_empty_board() {
        let board = Board::new_empty(5);
        for r in 0..5 {
            for c in 0..5 {
                assert_eq!(board.get_cell(r, c), Cell::Empty);
            }
        }
        assert_eq!(board.count_diamonds(), 0);
    }

    #[test]
    fn test_difficulty_bounds() {
        assert!(Difficulty::new(0).is_err());
        assert!(Difficulty::new(5).is_err());
        let expert = Difficulty::new(4).unwrap();
        assert_eq!(expert.board_size(), 7);
        assert_eq!(expert.line_clear_points(), 200);
        assert_eq!(expert.diamond_bonus(), 400);
        assert_eq!(expert.reroll_cost(), 40);
        assert_eq!(expert.initial_score(), 400);
    }

    #[test]
    fn test_shape_pool_sizes() {
        assert_eq!(Piece::pool(Difficulty::EASY).len(), 4);
        assert_eq!(Piece::pool(Difficulty::MEDIUM).len(), 8);
        assert_eq!(Piece::pool(Difficulty::HARD).len(), 11);
        assert_eq!(Piece::pool(Difficulty::EXPERT).len(), 14);
    }

    #[test]
    fn test_random_piece_comes_from_pool() {
        let mut rng = SmallRng::seed_from_u64(3);
        let pool = Piece::pool(Difficulty::MEDIUM);
        for _ in 0..50 {
            let piece = Piece::random(Difficulty::MEDIUM, &mut rng);
            assert!(pool.contains(&piece));
        }
    }

    #[test]
    fn test_new_random_board_counts() {
        let mut rng = SmallRng::seed_from_u64(11);
        let easy = Board::new_random(Difficulty::EASY, &mut rng);
        assert_eq!(easy.size(), 4);
        assert_eq!(easy.count_diamonds(), 1);
        let occupied = |b: &Board| {
            (0..b.size())
                .flat_map(|r| (0..b.size()).map(move |c| (r, c)))
                .filter(|&(r, c)| b.get_cell(r, c) == Cell::Occupied)
                .count()
        };
        assert_eq!(occupied(&easy), 1);

        let expert = Board::new_random(Difficulty::EXPERT, &mut rng);
        assert_eq!(expert.size(), 7);
        assert_eq!(expert.count_diamonds(), 4);
        assert_eq!(occupied(&expert), 4);
    }

    #[test]
    fn test_new_random_board_determinism() {
        let board1 = Board::new_random(Difficulty::HARD, &mut SmallRng::seed_from_u64(42));
        let board2 = Board::new_random(Difficulty::HARD, &mut SmallRng::seed_from_u64(42));
        assert_eq!(board1, board2);
    }

    #[test]
    fn test_check_placement_bounds_and_collisions() {
        let board = board_from_str_array(&["D...", ".#..", "....", "...."]).unwrap();
        let bar = Piece::from_rows(&[&[1, 1, 1]]).unwrap();

        assert_eq!(
            board.check_placement(&bar, 0, 2),
            Err(EngineError::OutOfBounds { row: 0, col: 2 })
        );
        assert_eq!(
            board.check_placement(&bar, 4, 0),
            Err(EngineError::OutOfBounds { row: 4, col: 0 })
        );
        // Diamonds block placement.
        assert_eq!(
            board.check_placement(&bar, 0, 0),
            Err(EngineError::Collision { row: 0, col: 0 })
        );
        assert_eq!(
            board.check_placement(&bar, 1, 0),
            Err(EngineError::Collision { row: 1, col: 1 })
        );
        assert!(board.can_place(&bar, 0, 1));
        assert!(board.can_place(&bar, 2, 1));
    }

    #[test]
    fn test_holes_in_piece_do_not_collide() {
        let board = board_from_str_array(&["....", ".#..", "....", "...."]).unwrap();
        let l_shape = Piece::from_rows(&[&[1, 1], &[1, 0]]).unwrap();
        assert!(board.can_place(&l_shape, 0, 0));
    }

    #[test]
    fn test_possible_placements_row_major() {
        let board = board_from_str_array(&["##..", "####", "####", "####"]).unwrap();
        assert_eq!(board.possible_placements(&Piece::single()), vec![(0, 2), (0, 3)]);
        assert_eq!(board.first_placement(&Piece::single()), Some((0, 2)));
        let square = Piece::from_rows(&[&[1, 1], &[1, 1]]).unwrap();
        assert!(board.possible_placements(&square).is_empty());
    }

    #[test]
    fn test_clear_row_and_column_counts_shared_cell_once() {
        // Row 0 and column 0 full, diamond on their intersection.
        let mut board = board_from_str_array(&["D###", "#...", "#...", "D..."]).unwrap();
        let report = board.clear_full_lines();
        assert_eq!(report.rows, 1);
        assert_eq!(report.cols, 1);
        assert_eq!(report.diamonds, 2);
        assert_eq!(board, Board::new_empty(4));
    }

    #[test]
    fn test_clear_nothing() {
        let mut board = board_from_str_array(&["###.", "....", "....", "...."]).unwrap();
        let before = board.clone();
        assert_eq!(board.clear_full_lines(), ClearReport::default());
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_points_combo() {
        let single = ClearReport { rows: 1, cols: 0, diamonds: 0 };
        assert_eq!(single.points(Difficulty::EASY), 50);
        let triple = ClearReport { rows: 2, cols: 1, diamonds: 0 };
        // 3 * 100 + 2 * 100 / 2
        assert_eq!(triple.points(Difficulty::MEDIUM), 400);
        assert_eq!(ClearReport::default().points(Difficulty::EXPERT), 0);
    }

    #[test]
    fn test_apply_placement_penalty_and_clear() {
        let mut board = board_from_str_array(&["D##.", "....", "....", "...."]).unwrap();
        let report = board
            .apply_placement(&Piece::single(), (0, 3), Difficulty::EASY)
            .unwrap();
        assert_eq!(report.cleared.rows, 1);
        assert_eq!(report.cleared.diamonds, 1);
        assert_eq!(report.score_delta, 50 + 100 - 10);
        assert_eq!(board, Board::new_empty(4));
    }

    #[test]
    fn test_apply_placement_invalid_leaves_board() {
        let mut board = board_from_str_array(&["#...", "....", "....", "...."]).unwrap();
        let before = board.clone();
        assert!(board
            .apply_placement(&Piece::single(), (0, 0), Difficulty::EASY)
            .is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_display_board_formatting() {
        let board = board_from_str_array(&["D#..", "....", "....", "...."]).unwrap();
        let text = format!("{}", board);
        assert!(text.starts_with("  0 1 2 3 "));
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("0 D # . . "));

        let overlay = board.to_string_with_piece(Some((&Piece::single(), (1, 1))));
        assert!(overlay.contains("1 . + . . "));
    }

    #[test]
    fn test_game_new_is_seeded() {
        let game1 = Game::new(Difficulty::MEDIUM, 99);
        let game2 = Game::new(Difficulty::MEDIUM, 99);
        assert_eq!(game1.board(), game2.board());
        assert_eq!(game1.piece(), game2.piece());
        assert_eq!(game1.score(), 200);
        // floor(0.10 * 25) diamonds on a 5x5 board.
        assert_eq!(game1.total_diamonds(), 2);
        assert_eq!(game1.diamonds_collected(), 0);
    }

    #[test]
    fn test_game_place_piece_victory() {
        let board = board_from_str_array(&["D##.", "....", "....", "...."]).unwrap();
        let mut game = Game::from_parts(board, Piece::single(), 100, Difficulty::EASY, 1);
        assert_eq!(game.outcome(), None);
        game.place_piece(0, 3).unwrap();
        assert_eq!(game.score(), 240);
        assert_eq!(game.steps(), 1);
        assert_eq!(game.diamonds_collected(), 1);
        assert_eq!(game.outcome(), Some(GameOutcome::Victory));
    }

    #[test]
    fn test_game_place_piece_score_saturates() {
        let board = board_from_str_array(&["D##.", "....", "....", "...."]).unwrap();
        let mut game = Game::from_parts(board, Piece::single(), i32::MAX, Difficulty::EASY, 0);
        game.place_piece(0, 3).unwrap();
        assert_eq!(game.score(), i32::MAX);
        assert_eq!(game.outcome(), Some(GameOutcome::Victory));
    }

    #[test]
    fn test_game_invalid_placement_changes_nothing() {
        let board = board_from_str_array(&["#...", "....", "....", "...."]).unwrap();
        let mut game = Game::from_parts(board, Piece::single(), 100, Difficulty::EASY, 1);
        assert!(game.place_piece(0, 0).is_err());
        assert_eq!(game.score(), 100);
        assert_eq!(game.steps(), 0);
    }

    #[test]
    fn test_game_out_of_score_and_no_moves() {
        let board = board_from_str_array(&["D...", "....", "....", "...."]).unwrap();
        let game = Game::from_parts(board.clone(), Piece::single(), 0, Difficulty::EASY, 1);
        assert_eq!(game.outcome(), Some(GameOutcome::OutOfScore));

        let full = board_from_str_array(&["D##.", "###.", "###.", "###D"]).unwrap();
        let square = Piece::from_rows(&[&[1, 1], &[1, 1]]).unwrap();
        let stuck = Game::from_parts(full, square, 50, Difficulty::EASY, 1);
        assert_eq!(stuck.outcome(), Some(GameOutcome::NoMoves));
    }

    #[test]
    fn test_game_reroll() {
        let board = board_from_str_array(&["D...", "....", "....", "...."]).unwrap();
        let mut game = Game::from_parts(board.clone(), Piece::single(), 25, Difficulty::MEDIUM, 5);
        game.reroll().unwrap();
        assert_eq!(game.score(), 5);
        assert_eq!(
            game.reroll(),
            Err(EngineError::RerollUnaffordable { score: 5, cost: 20 })
        );
        assert_eq!(game.score(), 5);
    }
}

use crate::engine::{Board, Cell, Piece};
use crate::error::EngineError;

/// Parses an array of string slices into a `Board`.
///
/// Each string slice represents a row, starting from row 0. The board is
/// square, so every row must contain exactly as many cells as there are rows.
///
/// Valid characters are:
/// - '.' or ' ': `Cell::Empty`
/// - '#': `Cell::Occupied` (obstacle or placed block)
/// - 'D': `Cell::Diamond`
///
/// # Errors
/// `EngineError::Parse` if a row has the wrong length, the board is empty or
/// too large, or an unrecognized character is found.
///
/// # Examples
/// ```
/// use woodblock_solver::utils::board_from_str_array;
/// use woodblock_solver::engine::Cell;
///
/// let board = board_from_str_array(&["D#.", "...", "..#"]).unwrap();
/// assert_eq!(board.size(), 3);
/// assert_eq!(board.get_cell(0, 0), Cell::Diamond);
/// assert_eq!(board.get_cell(0, 1), Cell::Occupied);
/// assert_eq!(board.get_cell(1, 1), Cell::Empty);
///
/// assert!(board_from_str_array(&["DX", ".."]).is_err());
/// assert!(board_from_str_array(&["...", "..."]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, EngineError> {
    let mut rows = Vec::with_capacity(s.len());
    for (r, row_str) in s.iter().enumerate() {
        let row = row_str
            .chars()
            .enumerate()
            .map(|(c, ch)| {
                Cell::from_char(ch).ok_or_else(|| {
                    EngineError::Parse(format!(
                        "Unrecognized character '{}' in row {} col {}",
                        ch, r, c
                    ))
                })
            })
            .collect::<Result<Vec<Cell>, EngineError>>()?;
        rows.push(row);
    }
    Board::from_rows(rows)
}

/// Parses a piece drawn with '#' (or '1') for filled cells and '.' (or '0') for holes.
///
/// # Examples
/// ```
/// use woodblock_solver::utils::piece_from_str_array;
/// let t_shape = piece_from_str_array(&["###", ".#."]).unwrap();
/// assert_eq!((t_shape.height(), t_shape.width()), (2, 3));
/// assert!(!t_shape.is_filled(1, 0));
/// ```
pub fn piece_from_str_array(s: &[&str]) -> Result<Piece, EngineError> {
    let mut rows: Vec<Vec<u8>> = Vec::with_capacity(s.len());
    for (r, row_str) in s.iter().enumerate() {
        let row = row_str
            .chars()
            .map(|ch| match ch {
                '#' | '1' => Ok(1),
                '.' | '0' => Ok(0),
                _ => Err(EngineError::Parse(format!(
                    "Unrecognized piece character '{}' in row {}",
                    ch, r
                ))),
            })
            .collect::<Result<Vec<u8>, EngineError>>()?;
        rows.push(row);
    }
    let slices: Vec<&[u8]> = rows.iter().map(Vec::as_slice).collect();
    Piece::from_rows(&slices)
}

/// Splits a text file's contents into the non-empty, trimmed lines
/// `board_from_str_array` expects. Trailing spaces are trimmed, so write empty
/// cells as '.' in files.
pub fn grid_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

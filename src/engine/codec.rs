//! Conversion between the human-readable 4x4 grid and the packed board.

use crate::error::InvalidTileError;

use super::state::Board;

/// Row-major grid of displayed tile values; 0 marks an empty cell.
pub type Grid = [[u32; 4]; 4];

const MAX_TILE: u32 = 1 << 15;

/// Pack a grid into a board. Fails on the first cell that is not 0 or a
/// power of two in `2..=32768`; no partial board is produced.
///
/// ```
/// use ai_2048_search::engine::{board_to_grid, grid_to_board};
/// let grid = [[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]];
/// let board = grid_to_board(&grid).unwrap();
/// assert_eq!(board_to_grid(board), grid);
/// assert!(grid_to_board(&[[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
/// ```
pub fn grid_to_board(grid: &Grid) -> Result<Board, InvalidTileError> {
    let mut board = Board::EMPTY;
    for (row, cells) in grid.iter().enumerate() {
        for (col, &value) in cells.iter().enumerate() {
            let rank = value_to_rank(value).ok_or(InvalidTileError { row, col, value })?;
            if rank != 0 {
                board = board.with_tile((row * 4 + col) as u8, rank);
            }
        }
    }
    Ok(board)
}

/// Unpack a board into displayed tile values.
pub fn board_to_grid(board: Board) -> Grid {
    std::array::from_fn(|row| std::array::from_fn(|col| board.tile_value(row * 4 + col)))
}

fn value_to_rank(value: u32) -> Option<u8> {
    match value {
        0 => Some(0),
        // 1 would be rank 0, which is reserved for empty cells
        v if v.is_power_of_two() && (2..=MAX_TILE).contains(&v) => Some(v.trailing_zeros() as u8),
        _ => None,
    }
}

impl TryFrom<&Grid> for Board {
    type Error = InvalidTileError;

    fn try_from(grid: &Grid) -> Result<Self, Self::Error> {
        grid_to_board(grid)
    }
}

impl From<Board> for Grid {
    fn from(board: Board) -> Self {
        board_to_grid(board)
    }
}

//! Bitboard move engine.
//!
//! Moves are simulated with per-line lookup tables: the board is split into
//! four 16-bit rows, each row is replaced by its precomputed result, and the
//! rows are reassembled. Vertical moves run the same procedure on the
//! transposed board. Tables are built once per process on first use and are
//! read-only afterwards, so any number of searches can share them.

mod codec;
mod state;
pub(crate) mod tables;

pub use codec::{board_to_grid, grid_to_board, Grid};
pub use state::{Board, EmptyCells, Move, MoveResult, Transition};

use tables::{move_tables, Line};

/// Initialize the move tables. Safe to call multiple times; every entry
/// point also initializes lazily.
pub fn new() {
    let _ = move_tables();
}

// Credit to Nneonneo
/// Bit-parallel 4x4 transpose of all 16 nibbles; an involution.
#[inline]
pub fn transpose(x: u64) -> u64 {
    let a1 = x & 0xF0F0_0F0F_F0F0_0F0F;
    let a2 = x & 0x0000_F0F0_0000_F0F0;
    let a3 = x & 0x0F0F_0000_0F0F_0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00_FF00_00FF_00FF;
    let b2 = a & 0x00FF_00FF_0000_0000;
    let b3 = a & 0x0000_0000_FF00_FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

/// Row `line_idx` (0 = top) of a packed board.
#[inline(always)]
pub(crate) fn extract_line(board: u64, line_idx: usize) -> Line {
    ((board >> ((3 - line_idx) * 16)) & 0xffff) as Line
}

/// Slide/merge the whole board in `dir`.
///
/// ```
/// use ai_2048_search::engine::{self, Board, Move};
/// let b = Board::from_raw(0x1010_0000_0000_0000);
/// let r = engine::simulate_move(b, Move::Right);
/// assert_eq!(r.board, Board::from_raw(0x0002_0000_0000_0000));
/// assert_eq!(r.score_delta, 4);
/// ```
pub fn simulate_move(board: Board, dir: Move) -> MoveResult {
    let t = move_tables();
    let (lines, scores): (&[Line], &[u32]) = match dir {
        Move::Left | Move::Up => (&t.left[..], &t.left_score[..]),
        Move::Right | Move::Down => (&t.right[..], &t.right_score[..]),
    };
    let (raw, score_delta) = match dir {
        Move::Left | Move::Right => slide_rows(board.raw(), lines, scores),
        Move::Up | Move::Down => {
            let (moved, score) = slide_rows(transpose(board.raw()), lines, scores);
            (transpose(moved), score)
        }
    };
    let moved = Board::from_raw(raw);
    MoveResult { board: moved, score_delta, changed: moved != board }
}

fn slide_rows(board: u64, lines: &[Line], scores: &[u32]) -> (u64, u64) {
    (0..4).fold((0, 0), |(acc, score), row_idx| {
        let row = extract_line(board, row_idx) as usize;
        (
            acc | (u64::from(lines[row]) << ((3 - row_idx) * 16)),
            score + u64::from(scores[row]),
        )
    })
}

/// Legal moves of `board` in canonical order: LEFT, RIGHT, UP, DOWN.
pub fn enumerate_moves(board: Board) -> impl Iterator<Item = Transition> {
    Move::ALL.into_iter().filter_map(move |dir| {
        let result = simulate_move(board, dir);
        result.changed.then_some(Transition {
            dir,
            board: result.board,
            score_delta: result.score_delta,
        })
    })
}

/// True if no move in any direction changes the board.
#[inline]
pub fn is_game_over(board: Board) -> bool {
    board.is_game_over()
}

use std::fmt;

use arrayvec::ArrayVec;
use rand::Rng;

use super::tables::move_tables;
use super::{enumerate_moves, extract_line, simulate_move};

type BoardRaw = u64;

/// A direction to slide/merge tiles.
///
/// [`Move::ALL`] is the canonical enumeration order and the tie-break used by
/// every search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Left, Move::Right, Move::Up, Move::Down];

    /// Integer code at the service boundary: 0 LEFT, 1 RIGHT, 2 UP, 3 DOWN.
    #[inline]
    pub fn code(self) -> i8 {
        match self {
            Move::Left => 0,
            Move::Right => 1,
            Move::Up => 2,
            Move::Down => 3,
        }
    }

    #[inline]
    pub fn from_code(code: i8) -> Option<Move> {
        match code {
            0 => Some(Move::Left),
            1 => Some(Move::Right),
            2 => Some(Move::Up),
            3 => Some(Move::Down),
            _ => None,
        }
    }

    /// Boundary encoding of a search result; `-1` means no legal move.
    #[inline]
    pub fn code_or_none(mv: Option<Move>) -> i8 {
        mv.map_or(-1, Move::code)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.code() as usize
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
            Move::Up => "UP",
            Move::Down => "DOWN",
        };
        f.write_str(name)
    }
}

/// Outcome of sliding a board in one direction.
///
/// `changed` is the only legality signal: a direction is legal iff it changes
/// the board. An unchanged result always carries `score_delta == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    pub board: Board,
    pub score_delta: u64,
    pub changed: bool,
}

/// A legal move together with the board and score it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub dir: Move,
    pub board: Board,
    pub score_delta: u64,
}

/// Row-major indices (0..16) of empty cells.
pub type EmptyCells = ArrayVec<u8, 16>;

/// Packed 4x4 2048 board as 16 4-bit ranks in a `u64`.
///
/// Cell 0 (top-left) lives in the highest nibble; rows follow in row-major
/// order. A rank `k > 0` stands for the tile `2^k`, rank 0 for an empty cell.
/// Boards are plain values: every operation returns a new board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// Consume this `Board`, returning the raw packed `u64`.
    #[inline]
    pub fn into_raw(self) -> BoardRaw {
        self.0
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.0
    }

    /// Slide/merge in `dir` and report the score gained and whether anything moved.
    ///
    /// ```
    /// use ai_2048_search::engine::{Board, Move};
    /// let b = Board::from_raw(0x1100_0000_0000_0000);
    /// let r = b.simulate(Move::Left);
    /// assert_eq!(r.board, Board::from_raw(0x2000_0000_0000_0000));
    /// assert_eq!(r.score_delta, 4);
    /// assert!(r.changed);
    /// ```
    #[inline]
    pub fn simulate(self, dir: Move) -> MoveResult {
        simulate_move(self, dir)
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        simulate_move(self, dir).board
    }

    /// Legal moves in canonical order (LEFT, RIGHT, UP, DOWN).
    #[inline]
    pub fn legal_moves(self) -> impl Iterator<Item = Transition> {
        enumerate_moves(self)
    }

    /// Rank stored at row-major `idx` (0..16).
    #[inline]
    pub fn rank_at(self, idx: usize) -> u8 {
        debug_assert!(idx < 16);
        ((self.0 >> (60 - 4 * idx)) & 0xf) as u8
    }

    /// Displayed tile value at row-major `idx`; 0 for an empty cell.
    #[inline]
    pub fn tile_value(self, idx: usize) -> u32 {
        match self.rank_at(idx) {
            0 => 0,
            rank => 1 << rank,
        }
    }

    /// Place `rank` in the empty cell at `idx`.
    #[inline]
    pub fn with_tile(self, idx: u8, rank: u8) -> Self {
        debug_assert!(idx < 16 && rank <= 15);
        debug_assert_eq!(self.rank_at(idx as usize), 0, "cell {idx} is occupied");
        Board(self.0 | (BoardRaw::from(rank) << (60 - 4 * u32::from(idx))))
    }

    /// Insert a 2 (90%) or 4 (10%) tile into a uniformly chosen empty cell.
    ///
    /// A full board is returned unchanged.
    ///
    /// ```
    /// use ai_2048_search::engine::Board;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let cells = self.empty_cells();
        if cells.is_empty() {
            return self;
        }
        let cell = cells[rng.gen_range(0..cells.len())];
        let rank = if rng.gen_range(0..10) < 9 { 1 } else { 2 };
        self.with_tile(cell, rank)
    }

    /// Slide in `dir`, then spawn a random tile if the slide changed the board.
    #[inline]
    pub fn make_move<R: Rng + ?Sized>(self, dir: Move, rng: &mut R) -> Self {
        let moved = self.shift(dir);
        if moved != self {
            moved.with_random_tile(rng)
        } else {
            self
        }
    }

    /// Row-major indices of the empty cells, looked up per row.
    pub fn empty_cells(self) -> EmptyCells {
        let gaps = &move_tables().gaps;
        let mut cells = EmptyCells::new();
        for row in 0..4 {
            let line = extract_line(self.0, row);
            for &col in &gaps[line as usize] {
                cells.push(row as u8 * 4 + col);
            }
        }
        cells
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u32 {
        let mut occupied = self.0;
        occupied |= occupied >> 1;
        occupied |= occupied >> 2;
        occupied &= 0x1111_1111_1111_1111;
        16 - occupied.count_ones()
    }

    /// Highest tile value on the board (0 when empty).
    pub fn highest_tile(self) -> u32 {
        match (0..16).map(|idx| self.rank_at(idx)).max() {
            Some(0) | None => 0,
            Some(rank) => 1 << rank,
        }
    }

    /// Return true if no direction changes the board.
    ///
    /// ```
    /// use ai_2048_search::engine::Board;
    /// assert!(Board::EMPTY.is_game_over());
    /// ```
    #[inline]
    pub fn is_game_over(self) -> bool {
        enumerate_moves(self).next().is_none()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            if row > 0 {
                writeln!(f, "{}", "-".repeat(31))?;
            }
            let cells: Vec<String> = (0..4)
                .map(|col| match self.tile_value(row * 4 + col) {
                    0 => " ".repeat(7),
                    value => format!("{value:^7}"),
                })
                .collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl From<BoardRaw> for Board {
    fn from(raw: BoardRaw) -> Self {
        Board::from_raw(raw)
    }
}

impl From<Board> for BoardRaw {
    fn from(board: Board) -> Self {
        board.into_raw()
    }
}

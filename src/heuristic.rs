//! Board evaluation from precomputed per-line tables.
//!
//! Every 16-bit line pattern gets its feature values computed once: four
//! snake-gradient contributions (one per row position), free cells,
//! smoothness, merge potential and the two monotonicity penalties.
//! [`evaluate`] then needs only 8 lookups per feature (4 rows, 4 columns).

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::engine::tables::{decode_line, LINE_TABLE_SIZE};
use crate::engine::{self, extract_line, Board};

/// Serpentine positional weights, growing geometrically toward the top-left.
///
/// Row 0 runs right-to-left from the corner, row 1 left-to-right, and so on,
/// tracing one monotone path through all 16 cells.
const SNAKE: [[f64; 4]; 4] = [
    [65536.0, 32768.0, 16384.0, 8192.0],
    [512.0, 1024.0, 2048.0, 4096.0],
    [256.0, 128.0, 64.0, 32.0],
    [2.0, 4.0, 8.0, 16.0],
];

/// User-tunable coefficients of the auxiliary heuristic terms.
///
/// The snake gradient is never weighted; these terms act as tie-breakers on
/// top of it. Missing keys in JSON fall back to [`Weights::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Weights {
    pub monotonic: f64,
    pub smoothness: f64,
    pub free_tiles: f64,
    pub merges: f64,
}

impl Weights {
    pub const DEFAULT: Weights = Weights { monotonic: 1.0, smoothness: 0.1, free_tiles: 10.0, merges: 1.0 };

    /// Older tuning with a lighter free-cell reward.
    pub const LEGACY: Weights = Weights { free_tiles: 2.7, ..Weights::DEFAULT };
}

impl Default for Weights {
    fn default() -> Self {
        Weights::DEFAULT
    }
}

struct HeuristicTables {
    gradient: [Box<[f64]>; 4],
    free: Box<[f64]>,
    smoothness: Box<[f64]>,
    merges: Box<[f64]>,
    mono_left: Box<[f64]>,
    mono_right: Box<[f64]>,
}

static HEURISTIC_TABLES: OnceLock<HeuristicTables> = OnceLock::new();

pub(crate) fn warm() {
    let _ = heuristic_tables();
}

#[inline(always)]
fn heuristic_tables() -> &'static HeuristicTables {
    HEURISTIC_TABLES.get_or_init(create_tables)
}

fn create_tables() -> HeuristicTables {
    log::trace!("building heuristic tables for {LINE_TABLE_SIZE} line patterns");
    let table = || vec![0.0f64; LINE_TABLE_SIZE];
    let mut gradient = [table(), table(), table(), table()];
    let (mut free, mut smoothness, mut merges) = (table(), table(), table());
    let (mut mono_left, mut mono_right) = (table(), table());

    for pattern in 0..LINE_TABLE_SIZE {
        let ranks = decode_line(pattern as u16);
        let values = ranks.map(|rank| if rank == 0 { 0.0 } else { f64::from(1u32 << rank) });

        for (row, weights) in SNAKE.iter().enumerate() {
            gradient[row][pattern] = values.iter().zip(weights).map(|(v, w)| v * w).sum();
        }
        free[pattern] = ranks.iter().filter(|&&rank| rank == 0).count() as f64;
        smoothness[pattern] = line_smoothness(&ranks);
        merges[pattern] = line_merges(&ranks);
        (mono_left[pattern], mono_right[pattern]) = line_monotonicity(&values);
    }

    HeuristicTables {
        gradient: gradient.map(Vec::into_boxed_slice),
        free: free.into_boxed_slice(),
        smoothness: smoothness.into_boxed_slice(),
        merges: merges.into_boxed_slice(),
        mono_left: mono_left.into_boxed_slice(),
        mono_right: mono_right.into_boxed_slice(),
    }
}

/// Negated rank distance between adjacent occupied cells.
fn line_smoothness(ranks: &[u8; 4]) -> f64 {
    ranks
        .windows(2)
        .filter(|pair| pair[0] != 0 && pair[1] != 0)
        .map(|pair| -f64::from(pair[0].abs_diff(pair[1])))
        .sum()
}

/// Runs of equal ranks, skipping empty cells; a run of n tiles scores n.
fn line_merges(ranks: &[u8; 4]) -> f64 {
    let mut prev = 0;
    let mut counter = 0u32;
    let mut merges = 0u32;
    for &rank in ranks.iter().filter(|&&rank| rank != 0) {
        if rank == prev {
            counter += 1;
        } else if counter > 0 {
            merges += 1 + counter;
            counter = 0;
        }
        prev = rank;
    }
    if counter > 0 {
        merges += 1 + counter;
    }
    f64::from(merges)
}

/// Penalties (both <= 0) for decreasing and increasing steps, on tile values.
fn line_monotonicity(values: &[f64; 4]) -> (f64, f64) {
    values.windows(2).fold((0.0, 0.0), |(left, right), pair| {
        let (curr, next) = (pair[0], pair[1]);
        if curr > next {
            (left + (next - curr), right)
        } else if next > curr {
            (left, right + (curr - next))
        } else {
            (left, right)
        }
    })
}

/// Score a board: unweighted snake gradient plus weighted auxiliary terms.
///
/// Free cells are counted on rows only; merges and smoothness on rows and
/// columns; monotonicity takes the better direction separately for rows and
/// for columns. Pure: equal inputs always produce bit-identical output.
///
/// ```
/// use ai_2048_search::engine::Board;
/// use ai_2048_search::heuristic::{evaluate, Weights};
/// // 16 free cells, nothing else
/// assert_eq!(evaluate(Board::EMPTY, &Weights::default()), 160.0);
/// ```
pub fn evaluate(board: Board, weights: &Weights) -> f64 {
    let t = heuristic_tables();
    let rows = board.raw();
    let cols = engine::transpose(rows);

    let mut snake = 0.0;
    let mut free = 0.0;
    let mut merges = 0.0;
    let mut smoothness = 0.0;
    let (mut row_left, mut row_right) = (0.0, 0.0);
    let (mut col_left, mut col_right) = (0.0, 0.0);
    for idx in 0..4 {
        let row = extract_line(rows, idx) as usize;
        let col = extract_line(cols, idx) as usize;
        snake += t.gradient[idx][row];
        free += t.free[row];
        merges += t.merges[row] + t.merges[col];
        smoothness += t.smoothness[row] + t.smoothness[col];
        row_left += t.mono_left[row];
        row_right += t.mono_right[row];
        col_left += t.mono_left[col];
        col_right += t.mono_right[col];
    }
    let monotonic = f64::max(row_left, row_right) + f64::max(col_left, col_right);

    snake
        + free * weights.free_tiles
        + merges * weights.merges
        + smoothness * weights.smoothness
        + monotonic * weights.monotonic
}

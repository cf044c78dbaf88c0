//! Move selection strategies for 2048.
//!
//! Five interchangeable policies share the [`SearchStrategy`] interface:
//! - [`Minimax`]: adversarial tile placement, sampled MIN nodes.
//! - [`Expectimax`]: true expectation over tile spawns with probability pruning.
//! - [`MonteCarlo`]: mean score of greedy-biased random rollouts.
//! - [`GreedyBfs`] / [`GreedyDfs`]: agent-only lookahead, no tile spawns.
//!
//! Notes
//! - Every strategy returns `None` when no direction changes the board; at the
//!   integer boundary that is `-1` (see [`select_move_code`]).
//! - Ties resolve to the first direction in LEFT, RIGHT, UP, DOWN order.
//! - Randomness (minimax cell sampling, MCTS rollouts) comes from the RNG the
//!   strategy owns, so a fixed `seed` reproduces results exactly.
//!
//! Quick start
//! ```
//! use ai_2048_search::config::SearchConfig;
//! use ai_2048_search::engine::{grid_to_board, Move};
//! use ai_2048_search::search::{Expectimax, SearchStrategy};
//!
//! let board = grid_to_board(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
//! let mut ex = Expectimax::new(SearchConfig::with_depth(2));
//! assert!(ex.select_move(board).is_some());
//! assert!(ex.last_stats().nodes > 0);
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{CacheMode, SearchConfig};
use crate::engine::{self, grid_to_board, Board, Grid, Move};
use crate::error::InvalidTileError;
use crate::heuristic;

mod expectimax;
mod greedy;
mod mcts;
mod minimax;

pub use expectimax::Expectimax;
pub use greedy::{GreedyBfs, GreedyDfs};
pub use mcts::MonteCarlo;
pub use minimax::Minimax;

/// A move-selection policy.
pub trait SearchStrategy {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Best direction for `board`, or `None` if no direction is legal.
    fn select_move(&mut self, board: Board) -> Option<Move>;

    /// Statistics of the last [`select_move`](Self::select_move) call.
    fn last_stats(&self) -> SearchStats;
}

/// Decode `grid` and run `strategy`; `Ok(-1)` means no legal move.
///
/// A malformed grid is rejected before any search starts.
pub fn select_move_code(strategy: &mut dyn SearchStrategy, grid: &Grid) -> Result<i8, InvalidTileError> {
    let board = grid_to_board(grid)?;
    Ok(Move::code_or_none(strategy.select_move(board)))
}

/// Basic search stats for a single top-level call (`peak_nodes` spans calls).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
    pub cache_hits: u64,
    pub deadline_hit: bool,
}

/// Per-direction value at the root.
///
/// - `value` is the node value of taking `dir` from the current board.
/// - `legal` is false when the move is a no-op for the current board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Move,
    pub value: f64,
    pub legal: bool,
}

impl BranchEval {
    fn illegal(dir: Move) -> Self {
        Self { dir, value: f64::NEG_INFINITY, legal: false }
    }
}

/// First legal branch with the greatest value.
pub(crate) fn best_branch(branches: &[BranchEval]) -> Option<Move> {
    let mut best: Option<&BranchEval> = None;
    for branch in branches.iter().filter(|b| b.legal) {
        if best.map_or(true, |b| branch.value > b.value) {
            best = Some(branch);
        }
    }
    best.map(|b| b.dir)
}

/// The root always expands at least one ply, so a live board never yields `None`.
#[inline]
pub(crate) fn root_depth(depth: u32) -> u32 {
    depth.max(1)
}

pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Common helper for constructors to ensure tables are initialized.
pub(crate) fn warm_engine_and_heuristics() {
    engine::new();
    heuristic::warm();
}

/// Optional wall-clock budget for one top-level call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline(Option<Instant>);

impl Deadline {
    pub(crate) fn after_ms(limit_ms: Option<u64>) -> Self {
        Deadline(limit_ms.map(|ms| Instant::now() + Duration::from_millis(ms)))
    }

    #[inline]
    pub(crate) fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }
}

/// Scratch state of one top-level call: node counter, deadline and the
/// optional MAX-node memo table.
pub(crate) struct SearchFrame<V = f64> {
    pub(crate) nodes: u64,
    cache_hits: u64,
    deadline: Deadline,
    deadline_hit: bool,
    memo: Option<HashMap<(Board, u32), V>>,
    started: Instant,
}

impl<V: Copy> SearchFrame<V> {
    pub(crate) fn new(cfg: &SearchConfig) -> Self {
        Self {
            nodes: 0,
            cache_hits: 0,
            deadline: Deadline::after_ms(cfg.time_limit_ms),
            deadline_hit: false,
            memo: (cfg.cache == CacheMode::Memoized).then(HashMap::new),
            started: Instant::now(),
        }
    }

    /// Count a node expansion; true once the deadline has passed.
    #[inline]
    pub(crate) fn visit(&mut self) -> bool {
        self.nodes += 1;
        self.out_of_time()
    }

    #[inline]
    pub(crate) fn out_of_time(&mut self) -> bool {
        if self.deadline.expired() {
            self.deadline_hit = true;
        }
        self.deadline_hit
    }

    #[inline]
    pub(crate) fn cached(&mut self, board: Board, depth: u32) -> Option<V> {
        let hit = self.memo.as_ref()?.get(&(board, depth)).copied();
        if hit.is_some() {
            self.cache_hits += 1;
        }
        hit
    }

    #[inline]
    pub(crate) fn store(&mut self, board: Board, depth: u32, value: V) {
        // Values computed after the deadline are truncated, keep them out
        if self.deadline_hit {
            return;
        }
        if let Some(memo) = self.memo.as_mut() {
            memo.insert((board, depth), value);
        }
    }

    /// Publish this call's counters and log the decision.
    pub(crate) fn finish(self, name: &str, mv: Option<Move>, stats: &mut SearchStats) {
        stats.nodes = self.nodes;
        stats.peak_nodes = stats.peak_nodes.max(self.nodes);
        stats.cache_hits = self.cache_hits;
        stats.deadline_hit = self.deadline_hit;
        log::debug!(
            "{name}: move={} nodes={} cache_hits={} deadline_hit={} elapsed={:?}",
            Move::code_or_none(mv),
            self.nodes,
            self.cache_hits,
            self.deadline_hit,
            self.started.elapsed()
        );
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn branch(dir: Move, value: f64, legal: bool) -> BranchEval {
        BranchEval { dir, value, legal }
    }

    #[test]
    fn best_branch_prefers_first_on_ties() {
        let branches = [
            branch(Move::Left, 1.0, false),
            branch(Move::Right, 5.0, true),
            branch(Move::Up, 5.0, true),
            branch(Move::Down, 4.0, true),
        ];
        assert_eq!(best_branch(&branches), Some(Move::Right));
        assert_eq!(best_branch(&Move::ALL.map(BranchEval::illegal)), None);
    }

    #[test]
    fn root_depth_is_at_least_one() {
        assert_eq!(root_depth(0), 1);
        assert_eq!(root_depth(4), 4);
    }

    #[test]
    fn frame_memo_only_when_memoized() {
        let plain = SearchConfig::default();
        let mut frame: SearchFrame = SearchFrame::new(&plain);
        frame.store(Board::EMPTY, 2, 1.0);
        assert_eq!(frame.cached(Board::EMPTY, 2), None);

        let memo = SearchConfig { cache: CacheMode::Memoized, ..plain };
        let mut frame: SearchFrame = SearchFrame::new(&memo);
        frame.store(Board::EMPTY, 2, 1.0);
        assert_eq!(frame.cached(Board::EMPTY, 2), Some(1.0));
        assert_eq!(frame.cached(Board::EMPTY, 1), None);
        let mut stats = SearchStats::default();
        frame.finish("test", None, &mut stats);
        assert_eq!(stats.cache_hits, 1);
    }

    #[test]
    fn zero_budget_expires_immediately() {
        let cfg = SearchConfig { time_limit_ms: Some(0), ..SearchConfig::default() };
        let mut frame: SearchFrame = SearchFrame::new(&cfg);
        assert!(frame.visit());
        let mut unlimited: SearchFrame = SearchFrame::new(&SearchConfig::default());
        assert!(!unlimited.visit());
    }

    #[test]
    fn grid_boundary_reports_codes() {
        let mut dfs = GreedyDfs::new(SearchConfig::with_depth(2));
        let locked = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
        assert_eq!(select_move_code(&mut dfs, &locked), Ok(-1));
        let open = [[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]];
        assert!((0..4).contains(&select_move_code(&mut dfs, &open).unwrap()));
        let bad = [[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]];
        assert!(select_move_code(&mut dfs, &bad).is_err());
    }
}

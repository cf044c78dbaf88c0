use crate::config::SearchConfig;
use crate::engine::{enumerate_moves, simulate_move, Board, Move};
use crate::heuristic::evaluate;

use super::{
    best_branch, root_depth, warm_engine_and_heuristics, BranchEval, SearchFrame, SearchStats,
    SearchStrategy,
};

const PROB_TWO: f64 = 0.9;
const PROB_FOUR: f64 = 0.1;

/// Expectimax search over agent moves and tile spawns.
///
/// Chance nodes average over every empty cell, weighting a 2 by 0.9 and a
/// 4 by 0.1. The probability of reaching a node is carried down the tree;
/// once it falls below `prob_cutoff` the node is scored by the heuristic
/// instead of being expanded. Deterministic: no RNG is involved.
pub struct Expectimax {
    cfg: SearchConfig,
    stats: SearchStats,
}

impl Expectimax {
    pub fn new(cfg: SearchConfig) -> Self {
        warm_engine_and_heuristics();
        Self { cfg, stats: SearchStats::default() }
    }

    /// EV at root (max node) at the configured depth; depth 0 is the heuristic.
    pub fn state_value(&mut self, board: Board) -> f64 {
        let mut frame = SearchFrame::new(&self.cfg);
        let value = self.max_node(board, self.cfg.depth, 1.0, &mut frame);
        frame.finish("expectimax", None, &mut self.stats);
        value
    }

    /// EV of each root direction in canonical order; illegal moves are
    /// marked `legal = false`.
    pub fn branch_values(&mut self, board: Board) -> [BranchEval; 4] {
        let mut frame = SearchFrame::new(&self.cfg);
        let branches = self.expand_root(board, &mut frame);
        frame.finish("expectimax", best_branch(&branches), &mut self.stats);
        branches
    }

    fn expand_root(&self, board: Board, frame: &mut SearchFrame) -> [BranchEval; 4] {
        frame.nodes += 1;
        let depth = root_depth(self.cfg.depth);
        Move::ALL.map(|dir| {
            let result = simulate_move(board, dir);
            if !result.changed {
                return BranchEval::illegal(dir);
            }
            let value = self.chance_node(result.board, depth - 1, 1.0, frame);
            BranchEval { dir, value, legal: true }
        })
    }

    #[inline]
    fn is_leaf(&self, depth: u32, cum_prob: f64, frame: &mut SearchFrame) -> bool {
        frame.visit() || depth == 0 || cum_prob < self.cfg.prob_cutoff
    }

    fn max_node(&self, board: Board, depth: u32, cum_prob: f64, frame: &mut SearchFrame) -> f64 {
        if self.is_leaf(depth, cum_prob, frame) {
            return evaluate(board, &self.cfg.weights);
        }
        if let Some(value) = frame.cached(board, depth) {
            return value;
        }
        let mut best: Option<f64> = None;
        for t in enumerate_moves(board) {
            let value = self.chance_node(t.board, depth - 1, cum_prob, frame);
            if best.map_or(true, |b| value > b) {
                best = Some(value);
            }
        }
        let value = best.unwrap_or_else(|| evaluate(board, &self.cfg.weights));
        frame.store(board, depth, value);
        value
    }

    fn chance_node(&self, board: Board, depth: u32, cum_prob: f64, frame: &mut SearchFrame) -> f64 {
        if self.is_leaf(depth, cum_prob, frame) {
            return evaluate(board, &self.cfg.weights);
        }
        let cells = board.empty_cells();
        if cells.is_empty() {
            return evaluate(board, &self.cfg.weights);
        }
        let count = cells.len() as f64;
        let cell_prob = cum_prob / count;
        let mut total = 0.0;
        for &cell in &cells {
            let two = self.max_node(board.with_tile(cell, 1), depth - 1, cell_prob * PROB_TWO, frame);
            let four = self.max_node(board.with_tile(cell, 2), depth - 1, cell_prob * PROB_FOUR, frame);
            total += two * PROB_TWO + four * PROB_FOUR;
        }
        total / count
    }
}

impl SearchStrategy for Expectimax {
    fn name(&self) -> &'static str {
        "expectimax"
    }

    fn select_move(&mut self, board: Board) -> Option<Move> {
        let mut frame = SearchFrame::new(&self.cfg);
        let mv = best_branch(&self.expand_root(board, &mut frame));
        frame.finish(self.name(), mv, &mut self.stats);
        mv
    }

    fn last_stats(&self) -> SearchStats {
        self.stats
    }
}

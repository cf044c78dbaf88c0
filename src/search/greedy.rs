//! Agent-only lookahead.
//!
//! Tile spawns are not modeled: the board is assumed to stay as the agent
//! left it, which keeps the branching factor at most 4 and lets the search go
//! much deeper. A leaf is worth `evaluate(board) + score gained on the path`;
//! each first move keeps the best leaf beneath it. [`GreedyBfs`] walks the tree
//! level by level with a queue, [`GreedyDfs`] recursively; both choose the
//! same move.

use std::collections::VecDeque;

use crate::config::SearchConfig;
use crate::engine::{enumerate_moves, simulate_move, Board, Move};
use crate::heuristic::evaluate;

use super::{
    best_branch, root_depth, warm_engine_and_heuristics, BranchEval, SearchFrame, SearchStats,
    SearchStrategy,
};

/// Breadth-first greedy lookahead.
pub struct GreedyBfs {
    cfg: SearchConfig,
    stats: SearchStats,
}

struct Frontier {
    board: Board,
    first: Move,
    depth: u32,
    gained: u64,
}

impl GreedyBfs {
    pub fn new(cfg: SearchConfig) -> Self {
        warm_engine_and_heuristics();
        Self { cfg, stats: SearchStats::default() }
    }

    fn expand_root(&self, board: Board, frame: &mut SearchFrame) -> [BranchEval; 4] {
        frame.nodes += 1;
        let depth = root_depth(self.cfg.depth);
        let mut best = Move::ALL.map(BranchEval::illegal);
        let mut queue: VecDeque<Frontier> = enumerate_moves(board)
            .map(|t| Frontier { board: t.board, first: t.dir, depth: 1, gained: t.score_delta })
            .collect();

        while let Some(node) = queue.pop_front() {
            let out_of_time = frame.visit();
            let mut expanded = false;
            if node.depth < depth && !out_of_time {
                for t in enumerate_moves(node.board) {
                    queue.push_back(Frontier {
                        board: t.board,
                        first: node.first,
                        depth: node.depth + 1,
                        gained: node.gained + t.score_delta,
                    });
                    expanded = true;
                }
            }
            if expanded {
                continue;
            }
            // depth bound, dead branch or deadline
            let value = evaluate(node.board, &self.cfg.weights) + node.gained as f64;
            let slot = &mut best[node.first.index()];
            if !slot.legal || value > slot.value {
                *slot = BranchEval { dir: node.first, value, legal: true };
            }
        }
        best
    }
}

impl SearchStrategy for GreedyBfs {
    fn name(&self) -> &'static str {
        "bfs"
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

/// Best leaf below a node: its heuristic and the score gained on the way down.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Leaf {
    eval: f64,
    gain: u64,
}

impl Leaf {
    #[inline]
    fn value(self) -> f64 {
        self.eval + self.gain as f64
    }
}

/// Depth-first greedy lookahead; supports [`CacheMode::Memoized`](crate::config::CacheMode).
pub struct GreedyDfs {
    cfg: SearchConfig,
    stats: SearchStats,
}

impl GreedyDfs {
    pub fn new(cfg: SearchConfig) -> Self {
        warm_engine_and_heuristics();
        Self { cfg, stats: SearchStats::default() }
    }

    fn expand_root(&self, board: Board, frame: &mut SearchFrame<Leaf>) -> [BranchEval; 4] {
        frame.nodes += 1;
        let depth = root_depth(self.cfg.depth);
        Move::ALL.map(|dir| {
            let result = simulate_move(board, dir);
            if !result.changed {
                return BranchEval::illegal(dir);
            }
            let leaf = self.best_leaf(result.board, depth - 1, frame);
            let value = leaf.eval + (result.score_delta + leaf.gain) as f64;
            BranchEval { dir, value, legal: true }
        })
    }

    fn best_leaf(&self, board: Board, depth: u32, frame: &mut SearchFrame<Leaf>) -> Leaf {
        let here = || Leaf { eval: evaluate(board, &self.cfg.weights), gain: 0 };
        if frame.visit() || depth == 0 {
            return here();
        }
        if let Some(leaf) = frame.cached(board, depth) {
            return leaf;
        }
        let mut best: Option<Leaf> = None;
        for t in enumerate_moves(board) {
            let below = self.best_leaf(t.board, depth - 1, frame);
            let leaf = Leaf { eval: below.eval, gain: below.gain + t.score_delta };
            if best.map_or(true, |b| leaf.value() > b.value()) {
                best = Some(leaf);
            }
        }
        let leaf = best.unwrap_or_else(here);
        frame.store(board, depth, leaf);
        leaf
    }
}

impl SearchStrategy for GreedyDfs {
    fn name(&self) -> &'static str {
        "dfs"
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

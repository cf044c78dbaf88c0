use arrayvec::ArrayVec;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::SearchConfig;
use crate::engine::{enumerate_moves, Board, Move, Transition};
use crate::heuristic::evaluate;

use super::{seeded_rng, warm_engine_and_heuristics, SearchFrame, SearchStats, SearchStrategy};

/// Chance of following the highest-scoring move during a rollout.
const GREEDY_PROB: f64 = 0.8;
/// Rollouts that run out of moves keep this fraction of their score.
const DEAD_END_PENALTY: f64 = 0.5;

/// Flat Monte Carlo: every legal root move is scored by the mean of
/// `simulations_per_move` rollouts.
///
/// A rollout alternates a random spawn with a mostly greedy agent move for
/// `rollout_horizon()` steps. Its value is the score gained along the way
/// plus the heuristic of the final board, or half the score if the game ends
/// early.
pub struct MonteCarlo<R = StdRng> {
    cfg: SearchConfig,
    rng: R,
    stats: SearchStats,
}

impl MonteCarlo<StdRng> {
    pub fn new(cfg: SearchConfig) -> Self {
        let rng = seeded_rng(cfg.seed);
        Self::with_rng(cfg, rng)
    }
}

impl<R: Rng> MonteCarlo<R> {
    pub fn with_rng(cfg: SearchConfig, rng: R) -> Self {
        warm_engine_and_heuristics();
        Self { cfg, rng, stats: SearchStats::default() }
    }

    /// Mean rollout value of one root transition.
    ///
    /// Once the deadline passes, the mean covers only the rollouts finished so
    /// far; the first one always runs.
    fn mean_rollout(&mut self, root: Transition, frame: &mut SearchFrame) -> f64 {
        let mut total = 0.0;
        let mut runs = 0u32;
        while runs < self.cfg.simulations_per_move.max(1) {
            if runs > 0 && frame.out_of_time() {
                break;
            }
            total += self.rollout(root.board, root.score_delta as f64, frame);
            runs += 1;
        }
        total / f64::from(runs)
    }

    fn rollout(&mut self, mut board: Board, mut score: f64, frame: &mut SearchFrame) -> f64 {
        for _ in 0..self.cfg.rollout_horizon() {
            frame.nodes += 1;
            if board.count_empty() == 0 {
                return score * DEAD_END_PENALTY;
            }
            board = board.with_random_tile(&mut self.rng);

            let moves: ArrayVec<Transition, 4> = enumerate_moves(board).collect();
            let Some(step) = self.policy(&moves) else {
                return score * DEAD_END_PENALTY;
            };
            board = step.board;
            score += step.score_delta as f64;
        }
        score + evaluate(board, &self.cfg.weights)
    }

    /// Greedy on immediate score with probability 0.8, uniform otherwise.
    fn policy(&mut self, moves: &[Transition]) -> Option<Transition> {
        if moves.is_empty() {
            return None;
        }
        if self.rng.gen_bool(GREEDY_PROB) {
            let mut best = moves[0];
            for &t in &moves[1..] {
                if t.score_delta > best.score_delta {
                    best = t;
                }
            }
            Some(best)
        } else {
            Some(moves[self.rng.gen_range(0..moves.len())])
        }
    }
}

impl<R: Rng> SearchStrategy for MonteCarlo<R> {
    fn name(&self) -> &'static str {
        "mcts"
    }

    fn select_move(&mut self, board: Board) -> Option<Move> {
        let mut frame = SearchFrame::new(&self.cfg);
        let mut best: Option<(Move, f64)> = None;
        for root in enumerate_moves(board) {
            let value = self.mean_rollout(root, &mut frame);
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((root.dir, value));
            }
        }
        let mv = best.map(|(dir, _)| dir);
        frame.finish(self.name(), mv, &mut self.stats);
        mv
    }

    fn last_stats(&self) -> SearchStats {
        self.stats
    }
}

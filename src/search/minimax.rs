use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;

use crate::config::SearchConfig;
use crate::engine::{enumerate_moves, simulate_move, Board, EmptyCells, Move};
use crate::heuristic::evaluate;

use super::{
    best_branch, root_depth, seeded_rng, warm_engine_and_heuristics, BranchEval, SearchFrame,
    SearchStats, SearchStrategy,
};

/// Two-player minimax: the agent maximizes, the tile spawner minimizes.
///
/// MIN nodes try a 2 and a 4 in each empty cell. With more than
/// `sample_cells` empty cells, that many are sampled uniformly without
/// replacement from the owned RNG.
pub struct Minimax<R = StdRng> {
    cfg: SearchConfig,
    rng: R,
    stats: SearchStats,
}

impl Minimax<StdRng> {
    pub fn new(cfg: SearchConfig) -> Self {
        let rng = seeded_rng(cfg.seed);
        Self::with_rng(cfg, rng)
    }
}

impl<R: Rng> Minimax<R> {
    pub fn with_rng(cfg: SearchConfig, rng: R) -> Self {
        warm_engine_and_heuristics();
        Self { cfg, rng, stats: SearchStats::default() }
    }

    /// Value of `board` as a MAX node at the configured depth.
    ///
    /// Depth 0 is the heuristic itself.
    pub fn state_value(&mut self, board: Board) -> f64 {
        let mut frame = SearchFrame::new(&self.cfg);
        let value = self.max_node(board, self.cfg.depth, &mut frame);
        frame.finish("minimax", None, &mut self.stats);
        value
    }

    /// Value of each root direction, in canonical order.
    pub fn branch_values(&mut self, board: Board) -> [BranchEval; 4] {
        let mut frame = SearchFrame::new(&self.cfg);
        let branches = self.expand_root(board, &mut frame);
        frame.finish("minimax", best_branch(&branches), &mut self.stats);
        branches
    }

    fn expand_root(&mut self, board: Board, frame: &mut SearchFrame) -> [BranchEval; 4] {
        frame.nodes += 1;
        let depth = root_depth(self.cfg.depth);
        Move::ALL.map(|dir| {
            let result = simulate_move(board, dir);
            if !result.changed {
                return BranchEval::illegal(dir);
            }
            let value = self.min_node(result.board, depth - 1, frame);
            BranchEval { dir, value, legal: true }
        })
    }

    fn max_node(&mut self, board: Board, depth: u32, frame: &mut SearchFrame) -> f64 {
        if frame.visit() || depth == 0 {
            return evaluate(board, &self.cfg.weights);
        }
        if let Some(value) = frame.cached(board, depth) {
            return value;
        }
        let mut best: Option<f64> = None;
        for t in enumerate_moves(board) {
            let value = self.min_node(t.board, depth - 1, frame);
            if best.map_or(true, |b| value > b) {
                best = Some(value);
            }
        }
        let value = best.unwrap_or_else(|| evaluate(board, &self.cfg.weights));
        frame.store(board, depth, value);
        value
    }

    fn min_node(&mut self, board: Board, depth: u32, frame: &mut SearchFrame) -> f64 {
        if frame.visit() || depth == 0 {
            return evaluate(board, &self.cfg.weights);
        }
        let cells = self.spawn_cells(board);
        if cells.is_empty() {
            return evaluate(board, &self.cfg.weights);
        }
        let mut worst = f64::INFINITY;
        for &cell in &cells {
            for rank in [1, 2] {
                worst = worst.min(self.max_node(board.with_tile(cell, rank), depth - 1, frame));
            }
        }
        worst
    }

    fn spawn_cells(&mut self, board: Board) -> EmptyCells {
        let cells = board.empty_cells();
        let cap = self.cfg.sample_cells.max(1);
        if cells.len() <= cap {
            return cells;
        }
        index::sample(&mut self.rng, cells.len(), cap)
            .iter()
            .map(|i| cells[i])
            .collect()
    }
}

impl<R: Rng> SearchStrategy for Minimax<R> {
    fn name(&self) -> &'static str {
        "minimax"
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

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::config::CacheMode;
    use crate::search::test_boards;

    fn seeded(depth: u32, seed: u64) -> Minimax {
        Minimax::new(SearchConfig { seed: Some(seed), ..SearchConfig::with_depth(depth) })
    }

    #[test]
    fn depth_zero_value_is_heuristic() {
        let board = test_boards::midgame();
        let mut mm = seeded(0, 1);
        assert_eq!(mm.state_value(board), evaluate(board, &SearchConfig::default().weights));
    }

    #[test]
    fn locked_board_has_no_move() {
        let mut mm = seeded(3, 1);
        assert_eq!(mm.select_move(test_boards::locked()), None);
        assert!(mm.branch_values(test_boards::locked()).iter().all(|b| !b.legal));
    }

    #[test]
    fn only_legal_directions_are_scored() {
        let mut mm = seeded(2, 4);
        let branches = mm.branch_values(test_boards::only_horizontal());
        let legal: Vec<Move> = branches.iter().filter(|b| b.legal).map(|b| b.dir).collect();
        assert_eq!(legal, vec![Move::Left, Move::Right]);
        let mv = mm.select_move(test_boards::only_horizontal());
        assert!(matches!(mv, Some(Move::Left | Move::Right)));
    }

    #[test]
    fn depth_one_picks_best_after_move() {
        let board = test_boards::midgame();
        let weights = SearchConfig::default().weights;
        let expected = crate::search::best_branch(&Move::ALL.map(|dir| {
            let r = simulate_move(board, dir);
            BranchEval { dir, value: evaluate(r.board, &weights), legal: r.changed }
        }));
        assert_eq!(seeded(1, 0).select_move(board), expected);
    }

    #[test]
    fn min_node_takes_worst_spawn() {
        // One empty cell: the MIN node must score the worse of a 2 and a 4.
        let board = test_boards::only_horizontal().shift(Move::Left);
        let mut mm = seeded(1, 0);
        let mut frame = SearchFrame::new(&mm.cfg);
        let weights = mm.cfg.weights;
        let cell = board.empty_cells()[0];
        let worst = evaluate(board.with_tile(cell, 1), &weights)
            .min(evaluate(board.with_tile(cell, 2), &weights));
        assert_eq!(mm.min_node(board, 1, &mut frame), worst);
    }

    #[test]
    fn sampling_caps_branching() {
        let mut mm = seeded(1, 8);
        let cells = mm.spawn_cells(Board::EMPTY.with_tile(0, 1));
        assert_eq!(cells.len(), 4);
        let mut sorted = cells.clone();
        sorted.sort_unstable();
        assert!(sorted.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn fixed_seed_reproduces_choice() {
        let board = test_boards::midgame();
        let first: Vec<BranchEval> = seeded(3, 42).branch_values(board).to_vec();
        let second: Vec<BranchEval> = seeded(3, 42).branch_values(board).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn memoized_search_matches_plain() {
        // RIGHT then a spawn at (3,0) and DOWN then a spawn at (0,3) meet.
        let board = Board::EMPTY.with_tile(0, 1);
        let plain = SearchConfig { sample_cells: 16, ..SearchConfig::with_depth(3) };
        let memo = SearchConfig { cache: CacheMode::Memoized, ..plain.clone() };
        let mut plain = Minimax::with_rng(plain, StdRng::seed_from_u64(5));
        let mut memo = Minimax::with_rng(memo, StdRng::seed_from_u64(5));
        assert_eq!(plain.branch_values(board), memo.branch_values(board));
        assert_eq!(plain.last_stats().cache_hits, 0);
        assert!(memo.last_stats().cache_hits > 0);
        assert!(memo.last_stats().nodes < plain.last_stats().nodes);
    }
}

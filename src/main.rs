use std::path::PathBuf;
use std::time::{Duration, Instant};

use ai_2048_search::config::{CacheMode, SearchConfig};
use ai_2048_search::engine::{self as GameEngine, Board};
use ai_2048_search::search::{Expectimax, GreedyBfs, GreedyDfs, Minimax, MonteCarlo, SearchStrategy};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    Minimax,
    Expectimax,
    Mcts,
    Bfs,
    Dfs,
}

impl Strategy {
    fn build(self, cfg: SearchConfig) -> Box<dyn SearchStrategy> {
        match self {
            Strategy::Minimax => Box::new(Minimax::new(cfg)),
            Strategy::Expectimax => Box::new(Expectimax::new(cfg)),
            Strategy::Mcts => Box::new(MonteCarlo::new(cfg)),
            Strategy::Bfs => Box::new(GreedyBfs::new(cfg)),
            Strategy::Dfs => Box::new(GreedyDfs::new(cfg)),
        }
    }
}

/// Play one game of 2048 with a search strategy choosing every move.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, value_enum, default_value = "expectimax")]
    strategy: Strategy,
    /// Search depth (overrides the config file)
    #[arg(long)]
    depth: Option<u32>,
    /// Seed for tile spawns and the strategy's RNG
    #[arg(long)]
    seed: Option<u64>,
    /// JSON file with search settings; missing keys take defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Memoize MAX-node values within each move
    #[arg(long)]
    memoize: bool,
    /// Per-move time budget in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// Stop after this many moves
    #[arg(long)]
    steps: Option<u64>,
    /// Do not print boards; show a status line instead
    #[arg(long)]
    quiet: bool,
}

impl Args {
    fn search_config(&self) -> anyhow::Result<SearchConfig> {
        let mut cfg = match &self.config {
            Some(path) => SearchConfig::from_json_path(path)
                .with_context(|| format!("loading search config from {}", path.display()))?,
            None => SearchConfig::default(),
        };
        if let Some(depth) = self.depth {
            cfg.depth = depth;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if self.memoize {
            cfg.cache = CacheMode::Memoized;
        }
        if self.time_limit_ms.is_some() {
            cfg.time_limit_ms = self.time_limit_ms;
        }
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    GameEngine::new();

    let cfg = args.search_config()?;
    log::info!("strategy={:?} config={}", args.strategy, serde_json::to_string(&cfg)?);
    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut strategy = args.strategy.build(cfg);

    let pb = if args.quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} | Moves: {msg}")
                .context("spinner template")?
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let mut board = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    if pb.is_none() {
        println!("{}", board);
    }
    let mut move_count: u64 = 0;
    let mut score: u64 = 0;
    let mut peak_nodes: u64 = 0;
    while !board.is_game_over() {
        let Some(direction) = strategy.select_move(board) else {
            break;
        };
        let stats = strategy.last_stats();
        peak_nodes = peak_nodes.max(stats.peak_nodes);
        let result = board.simulate(direction);
        score += result.score_delta;
        board = result.board.with_random_tile(&mut rng);
        move_count += 1;
        match &pb {
            Some(pb) => pb.set_message(format!("{} | score: {} | max tile: {}", move_count, score, board.highest_tile())),
            None => println!("{direction} (nodes: {})\n{}", stats.nodes, board),
        }
        if args.steps.is_some_and(|limit| move_count >= limit) {
            break;
        }
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    println!(
        "Moves made: {}, Score: {}, Highest tile: {}, Max states considered for a move: {}, Elapsed: {:.2?}",
        move_count,
        score,
        board.highest_tile(),
        peak_nodes,
        start.elapsed()
    );
    Ok(())
}

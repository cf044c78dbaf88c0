use ai_2048_search::config::{CacheMode, SearchConfig};
use ai_2048_search::engine::{self as GameEngine, Board, Move};
use ai_2048_search::search::{Expectimax, GreedyBfs, GreedyDfs, Minimax, MonteCarlo, SearchStrategy};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn warm() { GameEngine::new(); }

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(4242);
    let mut boards = Vec::new();
    let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    boards.push(b);
    let seq = [Move::Left, Move::Up, Move::Right, Move::Down];
    for i in 0..32 {
        let nb = b.shift(seq[i % seq.len()]);
        if nb != b { b = nb.with_random_tile(&mut rng); }
        boards.push(b);
    }
    boards
}

fn run(strategy: &mut dyn SearchStrategy, boards: &[Board]) -> i64 {
    let mut acc = 0i64;
    for &bd in boards { acc += i64::from(Move::code_or_none(strategy.select_move(bd))); }
    acc
}

fn bench_strategies(c: &mut Criterion) {
    warm();
    let boards = corpus();
    let cfg = SearchConfig { seed: Some(1), ..SearchConfig::with_depth(3) };

    let mut group = c.benchmark_group("select_move");
    group.sample_size(10);
    let mut strategies: Vec<Box<dyn SearchStrategy>> = vec![
        Box::new(Minimax::new(cfg.clone())),
        Box::new(Expectimax::new(cfg.clone())),
        Box::new(MonteCarlo::new(SearchConfig { simulations_per_move: 20, ..cfg.clone() })),
        Box::new(GreedyBfs::new(SearchConfig { depth: 5, ..cfg.clone() })),
        Box::new(GreedyDfs::new(SearchConfig { depth: 5, ..cfg.clone() })),
    ];
    for strategy in strategies.iter_mut() {
        let name = strategy.name();
        group.bench_function(name, |bch| bch.iter(|| black_box(run(strategy.as_mut(), &boards))));
    }
    group.finish();
}

fn bench_expectimax_values(c: &mut Criterion) {
    warm();
    let boards = corpus();
    let mut plain = Expectimax::new(SearchConfig::with_depth(3));
    let mut memo = Expectimax::new(SearchConfig { cache: CacheMode::Memoized, ..SearchConfig::with_depth(3) });

    let mut group = c.benchmark_group("expectimax");
    group.sample_size(10);
    group.bench_function("branch_values", |bch| {
        bch.iter(|| {
            let mut acc = 0.0;
            for &bd in &boards {
                for be in plain.branch_values(bd) { if be.legal { acc += be.value; } }
            }
            black_box(acc)
        })
    });
    group.bench_function("state_value/memoized", |bch| {
        bch.iter(|| {
            let mut acc = 0.0;
            for &bd in &boards { acc += memo.state_value(bd); }
            black_box(acc)
        })
    });
    group.finish();
}

criterion_group!(search, bench_strategies, bench_expectimax_values);
criterion_main!(search);

use ai_2048_search::engine::{self as GameEngine, board_to_grid, grid_to_board, Board, Move};
use ai_2048_search::heuristic::{evaluate, Weights};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn warm() { GameEngine::new(); }

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut boards = vec![Board::EMPTY];
    let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    boards.push(b);
    let seq = [Move::Left, Move::Up, Move::Right, Move::Down];
    for i in 0..20 {
        let nb = b.shift(seq[i % seq.len()]);
        if nb != b { b = nb.with_random_tile(&mut rng); }
        boards.push(b);
    }
    boards
}

fn bench_simulate(c: &mut Criterion) {
    warm();
    let boards = corpus();
    for dir in Move::ALL {
        c.bench_function(&format!("simulate/{}", dir.to_string().to_lowercase()), |bch| {
            bch.iter(|| {
                let mut acc = 0u64;
                for &bd in &boards {
                    let r = GameEngine::simulate_move(bd, dir);
                    acc ^= r.board.raw() ^ r.score_delta;
                }
                black_box(acc)
            })
        });
    }
    c.bench_function("enumerate_moves", |bch| {
        bch.iter(|| {
            let mut acc = 0u64;
            for &bd in &boards {
                for t in GameEngine::enumerate_moves(bd) { acc ^= t.board.raw(); }
            }
            black_box(acc)
        })
    });
    c.bench_function("transpose", |bch| {
        bch.iter(|| {
            let mut acc = 0u64;
            for &bd in &boards { acc ^= GameEngine::transpose(bd.raw()); }
            black_box(acc)
        })
    });
}

fn bench_spawn_and_codec(c: &mut Criterion) {
    warm();
    c.bench_function("board/with_random_tile", |bch| {
        bch.iter_batched(
            || (Board::EMPTY, StdRng::seed_from_u64(7)),
            |(mut bd, mut rng)| {
                for _ in 0..16 { bd = bd.with_random_tile(&mut rng); }
                black_box(bd)
            },
            BatchSize::SmallInput,
        )
    });
    let grids: Vec<_> = corpus().into_iter().map(board_to_grid).collect();
    c.bench_function("codec/grid_to_board", |bch| {
        bch.iter(|| {
            let mut acc = 0u64;
            for grid in &grids {
                if let Ok(bd) = grid_to_board(grid) { acc ^= bd.raw(); }
            }
            black_box(acc)
        })
    });
}

fn bench_heuristic(c: &mut Criterion) {
    warm();
    let boards = corpus();
    let weights = Weights::default();
    c.bench_function("heuristic/evaluate", |bch| {
        bch.iter(|| {
            let mut acc = 0f64;
            for &bd in &boards { acc = acc.mul_add(1.000_000_1, evaluate(bd, &weights)); }
            black_box(acc)
        })
    });
}

criterion_group!(engine_ops, bench_simulate, bench_spawn_and_codec, bench_heuristic);
criterion_main!(engine_ops);

//! Chess Engine Benchmarks
//!
//! Performance benchmarks for critical engine functions using Criterion.

use chess_engine::{best_move, evaluate, minimax_best_move, select_move, Board};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const MIDDLEGAME: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

fn bench_new_board(c: &mut Criterion) {
    c.bench_function("new_board", |b| b.iter(|| black_box(Board::new())));
}

fn bench_legal_moves_starting(c: &mut Criterion) {
    let board = Board::new();

    c.bench_function("legal_moves_starting_position", |b| {
        b.iter(|| black_box(board.legal_moves()))
    });
}

fn bench_evaluate_starting(c: &mut Criterion) {
    let board = Board::new();

    c.bench_function("evaluate_starting", |b| {
        b.iter(|| black_box(evaluate(&board)))
    });
}

fn bench_alphabeta_vs_minimax(c: &mut Criterion) {
    let mut group = c.benchmark_group("depth_3_middlegame");
    let mut board = Board::from_fen(MIDDLEGAME).expect("valid benchmark FEN");

    group.bench_function("alphabeta", |b| {
        b.iter(|| black_box(best_move(&mut board, 3, true)))
    });
    group.bench_function("minimax", |b| {
        b.iter(|| black_box(minimax_best_move(&mut board, 3, true)))
    });
    group.finish();
}

fn bench_levels(c: &mut Criterion) {
    let mut board = Board::new();

    for level in [1u8, 4, 6] {
        c.bench_function(&format!("select_move_level_{level}"), |b| {
            b.iter(|| black_box(select_move(&mut board, level, true)))
        });
    }
}

criterion_group!(
    benches,
    bench_new_board,
    bench_legal_moves_starting,
    bench_evaluate_starting,
    bench_alphabeta_vs_minimax,
    bench_levels,
);
criterion_main!(benches);

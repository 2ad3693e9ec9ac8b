use criterion::{criterion_group, criterion_main, Criterion, SamplingMode};
use std::hint::black_box;
use std::time::Duration;
use common::games::SessionRng;
use common::games::match3::{match_finder, Board, BoardController, EventLog, GameConfig};

fn bench_find_all_matches() {
    let mut session_rng = SessionRng::new(7);
    let board = Board::generate(&mut session_rng);
    black_box(match_finder::find_all_matches(&board));
}

fn bench_find_valid_swaps() {
    let mut session_rng = SessionRng::new(7);
    let board = Board::generate(&mut session_rng);
    black_box(match_finder::find_valid_swaps(&board));
}

fn bench_20_hinted_moves() {
    let config = GameConfig::default();
    let mut controller = BoardController::new(&config, SessionRng::from_random(), EventLog::new());
    for _ in 0..20 {
        let Some((from, to)) = controller.find_hint() else {
            break;
        };
        controller.make_move(from, to);
        controller.take_events();
    }
    black_box(controller.score());
}

fn bench_shuffle() {
    let config = GameConfig::default();
    let mut controller = BoardController::new(&config, SessionRng::from_random(), EventLog::new());
    for _ in 0..10 {
        controller.shuffle();
    }
    black_box(controller.board().gem_count());
}

fn cascade_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("match3");

    group
        .sampling_mode(SamplingMode::Flat)
        .sample_size(20)
        .measurement_time(Duration::from_secs(10));

    group.bench_function("find_all_matches", |b| {
        b.iter(bench_find_all_matches)
    });

    group.bench_function("find_valid_swaps", |b| {
        b.iter(bench_find_valid_swaps)
    });

    group.bench_function("20_hinted_moves", |b| {
        b.iter(bench_20_hinted_moves)
    });

    group.bench_function("10_shuffles", |b| {
        b.iter(bench_shuffle)
    });

    group.finish();
}

criterion_group!(benches, cascade_bench);
criterion_main!(benches);

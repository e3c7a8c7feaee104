use chrono::Utc;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use swiss_tourney::tournament::{
    FirstByeSelector, MatchOutcome, SubResult, Tournament, TournamentConfig, create_round,
    rebuild_ledgers, record_result, required_rounds, standings,
};

/// Helper to create a tournament with N enrolled players
fn setup_tournament(n_players: usize) -> Tournament {
    let mut tournament = Tournament::new(1, TournamentConfig::new("Bench", Utc::now(), 3600));
    tournament
        .enroll((0..n_players).map(|i| format!("player{}", i)))
        .unwrap();
    tournament
}

/// Play `rounds` rounds where the first seat always wins 2x1
fn play_rounds(tournament: &mut Tournament, rounds: u32) {
    for _ in 0..rounds {
        let round = create_round(tournament, &FirstByeSelector).unwrap();
        for game in &round.matches {
            record_result(
                tournament,
                game.id,
                SubResult::TwoOne,
                MatchOutcome::Player1Won,
                Some(game.player1),
            )
            .unwrap();
        }
    }
}

/// Benchmark round 1 pairing for different roster sizes
fn bench_first_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_round");

    for n_players in [8, 64, 512] {
        let tournament = setup_tournament(n_players);
        group.bench_with_input(
            BenchmarkId::from_parameter(n_players),
            &tournament,
            |b, tournament| {
                b.iter(|| {
                    let mut t = tournament.clone();
                    create_round(black_box(&mut t), &FirstByeSelector).unwrap()
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the last round, where rematch checks scan the full history
fn bench_last_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("last_round");

    for n_players in [8, 64, 512] {
        let mut tournament = setup_tournament(n_players);
        play_rounds(&mut tournament, required_rounds(n_players) - 1);

        group.bench_with_input(
            BenchmarkId::from_parameter(n_players),
            &tournament,
            |b, tournament| {
                b.iter(|| {
                    let mut t = tournament.clone();
                    create_round(black_box(&mut t), &FirstByeSelector).unwrap()
                });
            },
        );
    }

    group.finish();
}

/// Benchmark ledger re-derivation over a finished tournament
fn bench_rebuild_ledgers(c: &mut Criterion) {
    let mut tournament = setup_tournament(256);
    play_rounds(&mut tournament, required_rounds(256));

    c.bench_function("rebuild_ledgers_256", |b| {
        b.iter(|| rebuild_ledgers(black_box(&mut tournament)));
    });
}

/// Benchmark the standings table
fn bench_standings(c: &mut Criterion) {
    let mut tournament = setup_tournament(256);
    play_rounds(&mut tournament, required_rounds(256));

    c.bench_function("standings_256", |b| {
        b.iter(|| standings(black_box(&tournament)));
    });
}

criterion_group!(
    benches,
    bench_first_round,
    bench_last_round,
    bench_rebuild_ledgers,
    bench_standings
);
criterion_main!(benches);

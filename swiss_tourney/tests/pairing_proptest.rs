/// Property-based tests for round counting and pairing using proptest
///
/// These tests play whole tournaments with random rosters and random
/// results, checking the pairing and ledger invariants after every round.
use chrono::Utc;
use proptest::prelude::*;
use std::collections::HashSet;
use swiss_tourney::tournament::{
    FirstByeSelector, MatchOutcome, SubResult, Tournament, TournamentConfig, TournamentError,
    create_round, record_result, required_rounds,
};

// Smallest k with 2^k >= n, by doubling
fn log2_ceil(n: usize) -> u32 {
    let mut rounds = 0;
    let mut capacity = 1usize;
    while capacity < n {
        capacity *= 2;
        rounds += 1;
    }
    rounds
}

fn tournament_of(size: usize) -> Tournament {
    let mut tournament = Tournament::new(1, TournamentConfig::new("Prop", Utc::now(), 3600));
    tournament
        .enroll((0..size).map(|i| format!("player{i}")))
        .unwrap();
    tournament
}

// A random report: winner seat (0 draw, 1 first, 2 second) and shape
fn report_strategy() -> impl Strategy<Value = (u8, usize)> {
    (0u8..3, 0usize..SubResult::ALL.len())
}

/// Play every round, recording reports from `reports` in a cycle
fn play_out(tournament: &mut Tournament, reports: &[(u8, usize)]) {
    let mut next = reports.iter().cycle();
    while tournament.next_round_number() <= tournament.max_rounds() {
        let round = create_round(tournament, &FirstByeSelector).unwrap();
        for game in &round.matches {
            let &(seat, shape) = next.next().unwrap();
            let (outcome, winner) = match seat {
                0 => (MatchOutcome::Draw, None),
                1 => (MatchOutcome::Player1Won, Some(game.player1)),
                _ => (MatchOutcome::Player2Won, Some(game.player2)),
            };
            record_result(tournament, game.id, SubResult::ALL[shape], outcome, winner).unwrap();
        }
    }
}

proptest! {
    #[test]
    fn prop_required_rounds_is_log2_ceil(n in 0usize..5000) {
        let expected = if n < 2 { 0 } else { log2_ceil(n) };
        prop_assert_eq!(required_rounds(n), expected);
    }

    #[test]
    fn prop_required_rounds_is_monotonic(n in 0usize..5000) {
        prop_assert!(required_rounds(n) <= required_rounds(n + 1));
    }

    #[test]
    fn prop_each_player_appears_once_per_round(
        size in 1usize..40,
        reports in prop::collection::vec(report_strategy(), 1..64),
    ) {
        let mut tournament = tournament_of(size);
        play_out(&mut tournament, &reports);

        for round in &tournament.rounds {
            let mut seen = HashSet::new();
            for game in &round.matches {
                prop_assert_ne!(game.player1, game.player2);
                prop_assert!(seen.insert(game.player1));
                prop_assert!(seen.insert(game.player2));
            }
            if let Some(bye) = round.bye {
                prop_assert!(seen.insert(bye), "bye recipient also plays in round {}", round.number);
            }
        }
    }

    #[test]
    fn prop_no_pair_meets_twice(
        size in 2usize..40,
        reports in prop::collection::vec(report_strategy(), 1..64),
    ) {
        let mut tournament = tournament_of(size);
        play_out(&mut tournament, &reports);

        let mut pairs = HashSet::new();
        for game in tournament.matches() {
            let key = if game.player1 < game.player2 {
                (game.player1, game.player2)
            } else {
                (game.player2, game.player1)
            };
            prop_assert!(pairs.insert(key), "rematch in round {}", game.round_number);
        }
    }

    #[test]
    fn prop_round_count_and_byes(
        size in 1usize..40,
        reports in prop::collection::vec(report_strategy(), 1..64),
    ) {
        let mut tournament = tournament_of(size);
        play_out(&mut tournament, &reports);

        prop_assert_eq!(tournament.rounds.len() as u32, required_rounds(size));
        for round in &tournament.rounds {
            if size % 2 == 0 {
                prop_assert!(round.bye.is_none());
            }
        }
        if size >= 2 && size % 2 == 1 {
            prop_assert!(tournament.rounds[0].bye.is_some());
        }

        let is_limit = matches!(
            create_round(&mut tournament, &FirstByeSelector),
            Err(TournamentError::RoundLimitReached { .. })
        );
        prop_assert!(is_limit);
    }

    #[test]
    fn prop_ledgers_balance(
        size in 2usize..40,
        reports in prop::collection::vec(report_strategy(), 1..64),
    ) {
        let mut tournament = tournament_of(size);
        play_out(&mut tournament, &reports);

        let byes = tournament.rounds.iter().filter(|r| r.bye.is_some()).count() as u32;
        let decided = tournament
            .matches()
            .filter(|m| matches!(m.outcome, MatchOutcome::Player1Won | MatchOutcome::Player2Won))
            .count() as u32;

        let total_wins: u32 = tournament.players.iter().map(|p| p.wins).sum();
        let total_losses: u32 = tournament.players.iter().map(|p| p.losses).sum();
        prop_assert_eq!(total_wins, decided + byes);
        prop_assert_eq!(total_losses, decided);

        for player in &tournament.players {
            prop_assert_eq!(
                player.points,
                3 * player.wins + player.draws + player.sub_score()
            );
            prop_assert!(player.sub_results.len() as u32 <= player.wins);
        }
    }
}

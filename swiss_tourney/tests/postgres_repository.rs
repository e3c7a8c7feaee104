//! PostgreSQL repository tests
//!
//! These need a running database: set DATABASE_URL and run with
//! `--ignored`. Each test creates its own tournament, so they can share a
//! database, but they run serially to keep the pool small.

use std::sync::Arc;

use chrono::Utc;
use serial_test::serial;
use swiss_tourney::db::{Database, DatabaseConfig, TournamentRepository};
use swiss_tourney::tournament::{
    FirstByeSelector, Match, MatchOutcome, Player, Round, SubResult, TournamentConfig,
    TournamentError, TournamentManager, rebuild_ledgers, record_result,
};

async fn database() -> Database {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/swiss_tourney_test".to_string());
    let config = DatabaseConfig {
        max_connections: 2,
        ..DatabaseConfig::from_env_with_url(database_url)
    };

    Database::connect(&config)
        .await
        .expect("Failed to open tournament database")
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_round_trip_through_postgres() {
    let db = database().await;
    let manager = TournamentManager::new(Arc::new(db.tournament_repository()))
        .with_bye_selector(Arc::new(FirstByeSelector));

    let id = manager
        .create_tournament(TournamentConfig::new("Pg Open", Utc::now(), 7200))
        .await
        .unwrap();
    manager
        .enroll_players(id, vec!["A".into(), "B".into(), "C".into()])
        .await
        .unwrap();

    let round = manager.start_round(id).await.unwrap();
    let game = &round.matches[0];
    manager
        .record_result(game.id, SubResult::TwoOne, Some(game.player2))
        .await
        .unwrap();

    let tournament = manager.get_tournament(id).await.unwrap();
    assert_eq!(tournament.players.len(), 3);
    assert_eq!(tournament.players[0].name, "A");
    assert_eq!(tournament.rounds.len(), 1);
    assert_eq!(tournament.rounds[0].bye, round.bye);

    let stored = tournament.find_match(game.id).unwrap();
    assert_eq!(stored.outcome, MatchOutcome::Player2Won);
    assert_eq!(stored.sub_result, Some(SubResult::TwoOne));

    let winner = tournament.player(game.player2).unwrap();
    assert_eq!(winner.points, 5);
    assert_eq!(winner.sub_results, vec![SubResult::TwoOne]);

    manager.finalize_tournament(id).await.unwrap();
    assert!(manager.get_tournament(id).await.unwrap().is_finalized);

    db.close().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_duplicate_round_number_is_rejected() {
    let db = database().await;
    let repo = db.tournament_repository();

    let id = repo
        .create_tournament(&TournamentConfig::new("Pg Race", Utc::now(), 60))
        .await
        .unwrap();
    repo.save_round(id, &Round::new(1)).await.unwrap();

    let err = repo.save_round(id, &Round::new(1)).await.unwrap_err();
    assert!(matches!(err, TournamentError::ConcurrentModification(i) if i == id));

    db.close().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_results_from_stale_snapshots_are_both_kept() {
    let db = database().await;
    let repo = db.tournament_repository();

    let id = repo
        .create_tournament(&TournamentConfig::new("Pg Interleaved", Utc::now(), 60))
        .await
        .unwrap();
    let roster: Vec<Player> = ["A", "B", "C", "D"].into_iter().map(Player::new).collect();
    repo.save_players(id, &roster).await.unwrap();

    let mut round = Round::new(1);
    round.matches.push(Match::new(1, roster[0].id, roster[1].id));
    round.matches.push(Match::new(1, roster[2].id, roster[3].id));
    repo.save_round(id, &round).await.unwrap();

    let mut first = repo.load_tournament(id).await.unwrap().unwrap();
    let mut second = repo.load_tournament(id).await.unwrap().unwrap();

    for (snapshot, game) in [(&mut first, &round.matches[0]), (&mut second, &round.matches[1])] {
        let recorded = record_result(
            snapshot,
            game.id,
            SubResult::TwoZero,
            MatchOutcome::Player1Won,
            Some(game.player1),
        )
        .unwrap();
        repo.save_result(id, &recorded).await.unwrap();
    }

    let stored = repo.load_tournament(id).await.unwrap().unwrap();
    assert_eq!(stored.player(roster[0].id).unwrap().points, 6);
    assert_eq!(stored.player(roster[2].id).unwrap().points, 6);

    let mut rebuilt = stored.clone();
    rebuild_ledgers(&mut rebuilt);
    assert_eq!(rebuilt.players, stored.players);

    db.close().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_enrollment_after_first_round_is_refused() {
    let db = database().await;
    let repo = db.tournament_repository();

    let id = repo
        .create_tournament(&TournamentConfig::new("Pg Closed", Utc::now(), 60))
        .await
        .unwrap();
    repo.save_players(id, &[Player::new("A"), Player::new("B")])
        .await
        .unwrap();
    repo.save_round(id, &Round::new(1)).await.unwrap();

    let err = repo.save_players(id, &[Player::new("Late")]).await.unwrap_err();
    assert!(matches!(err, TournamentError::EnrollmentClosed(i) if i == id));
    assert_eq!(repo.load_tournament(id).await.unwrap().unwrap().players.len(), 2);

    db.close().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_longest_duration_is_stored() {
    let db = database().await;
    let repo = db.tournament_repository();

    let id = repo
        .create_tournament(&TournamentConfig::new("Pg Marathon", Utc::now(), u32::MAX))
        .await
        .unwrap();
    let tournament = repo.load_tournament(id).await.unwrap().unwrap();
    assert_eq!(tournament.duration_secs, u32::MAX);

    db.close().await;
}

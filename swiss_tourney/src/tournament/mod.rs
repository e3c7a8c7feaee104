//! Swiss-style tournament engine.
//!
//! This module provides:
//! - Round count derivation for a roster
//! - Round pairing with rematch avoidance and byes
//! - Match result recording with a best-of-3 sub-score
//! - Standings and winner determination
//! - A manager running these operations against a repository
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use swiss_tourney::db::InMemoryTournamentRepository;
//! use swiss_tourney::tournament::{SubResult, TournamentConfig, TournamentManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::new(Arc::new(InMemoryTournamentRepository::new()));
//!
//!     let config = TournamentConfig::new("Friday League", chrono::Utc::now(), 4 * 3600);
//!     let id = manager.create_tournament(config).await?;
//!     manager
//!         .enroll_players(id, vec!["Ash".into(), "Misty".into(), "Brock".into(), "Gary".into()])
//!         .await?;
//!
//!     let round = manager.start_round(id).await?;
//!     let game = &round.matches[0];
//!     manager
//!         .record_result(game.id, SubResult::TwoOne, Some(game.player1))
//!         .await?;
//!
//!     let leader = manager.determine_winner(id).await?;
//!     assert!(leader.is_some());
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod pairing;
pub mod results;
pub mod rounds;
pub mod standings;

pub use errors::{ParseSubResultError, TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    Match, MatchId, MatchOutcome, Player, PlayerId, Round, RoundId, SubResult, Tournament,
    TournamentConfig, TournamentId, TournamentInfo,
};
pub use pairing::{ByeSelector, FirstByeSelector, RandomByeSelector, create_round, have_played};
pub use results::{rebuild_ledgers, record_result};
pub use rounds::required_rounds;
pub use standings::{Standing, determine_winner, match_list_score, standings};

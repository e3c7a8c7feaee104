//! # Swiss Tourney
//!
//! Elimination-free ("Swiss-style") tournaments: a fixed roster plays
//! `ceil(log2(n))` rounds, each round pairing players who have not met yet,
//! with automatic byes for odd rosters. Wins, draws and a best-of-3 sub-score
//! accumulate into standings that name a champion.
//!
//! ## Core Modules
//!
//! - [`tournament`]: data model, pairing, result recording, standings and
//!   the [`TournamentManager`] service
//! - [`db`]: connection pooling and tournament repositories (PostgreSQL and
//!   in-memory)
//! - [`config`]: environment-driven configuration
//!
//! The engine functions in [`tournament`] are synchronous and operate on a
//! [`Tournament`] snapshot; the manager loads and persists snapshots.

/// Environment-driven configuration.
pub mod config;

/// Database pooling and repositories.
pub mod db;

/// Tournament engine and service layer.
pub mod tournament;

pub use config::{ConfigError, EngineConfig, ManagerConfig};
pub use tournament::{
    Match, MatchOutcome, Player, Round, SubResult, Tournament, TournamentError,
    TournamentManager, TournamentResult, required_rounds,
};

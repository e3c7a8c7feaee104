//! Tournament error types.

use super::models::{MatchId, RoundId, TournamentId};
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Tournament not found
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    /// Result recorded against an unknown match
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// Round not found
    #[error("Round not found: {0}")]
    RoundNotFound(RoundId),

    /// Round creation with an empty roster
    #[error("Tournament has no enrolled players")]
    NoPlayers,

    /// Every required round already exists
    #[error("Round limit reached: round {next_round} exceeds the {max_rounds} required rounds")]
    RoundLimitReached { next_round: u32, max_rounds: u32 },

    /// Winner is neither empty nor one of the two participants, or disagrees
    /// with the reported outcome
    #[error("Invalid winner for match {0}")]
    InvalidWinner(MatchId),

    /// Tournament was finalized
    #[error("Tournament {0} is already finalized")]
    AlreadyFinalized(TournamentId),

    /// Enrollment attempted after round 1 was created
    #[error("Enrollment for tournament {0} closed when the first round started")]
    EnrollmentClosed(TournamentId),

    /// Another writer created a round first
    #[error("Tournament {0} was modified concurrently")]
    ConcurrentModification(TournamentId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TournamentError {
    /// Get a client-safe error message
    ///
    /// Storage errors are replaced with a generic message so SQL details do
    /// not leak to whoever triggered the operation.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Database(_) | TournamentError::Serialization(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Whether the error was caused by the caller rather than the system
    pub fn is_caller_error(&self) -> bool {
        !matches!(
            self,
            TournamentError::Database(_)
                | TournamentError::Serialization(_)
                | TournamentError::ConcurrentModification(_)
        )
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;

/// Unrecognized best-of-3 result code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid best-of-3 result '{0}': expected one of 0x0, 1x1, 1x0, 2x0, 2x1")]
pub struct ParseSubResultError(pub String);

//! Tournament data models: players, matches, rounds and the tournament snapshot.
//!
//! Entities reference each other by id only. A [`Tournament`] owns its players
//! and rounds, a [`Round`] owns its matches, and a [`Match`] names its two
//! players by [`PlayerId`].

use super::errors::{ParseSubResultError, TournamentError, TournamentResult};
use super::rounds::required_rounds;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Tournament ID type (assigned by the repository)
pub type TournamentId = i64;

/// Player ID type
pub type PlayerId = Uuid;

/// Match ID type
pub type MatchId = Uuid;

/// Round ID type
pub type RoundId = Uuid;

/// Best-of-3 result shape reported for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubResult {
    #[serde(rename = "0x0")]
    ZeroZero,
    #[serde(rename = "1x1")]
    OneOne,
    #[serde(rename = "1x0")]
    OneZero,
    #[serde(rename = "2x0")]
    TwoZero,
    #[serde(rename = "2x1")]
    TwoOne,
}

impl SubResult {
    /// Every result shape, in display order
    pub const ALL: [SubResult; 5] = [
        SubResult::ZeroZero,
        SubResult::OneOne,
        SubResult::OneZero,
        SubResult::TwoZero,
        SubResult::TwoOne,
    ];

    /// Sub-score bonus awarded for this shape.
    ///
    /// Only `2x0`, `2x1` and `1x0` carry a bonus; the rest are worth nothing
    /// even when attached to a declared win.
    pub fn bonus(self) -> u32 {
        match self {
            SubResult::TwoZero => 3,
            SubResult::TwoOne => 2,
            SubResult::OneZero => 1,
            SubResult::ZeroZero | SubResult::OneOne => 0,
        }
    }

    /// Canonical code, e.g. `"2x0"`
    pub fn as_str(self) -> &'static str {
        match self {
            SubResult::ZeroZero => "0x0",
            SubResult::OneOne => "1x1",
            SubResult::OneZero => "1x0",
            SubResult::TwoZero => "2x0",
            SubResult::TwoOne => "2x1",
        }
    }
}

impl fmt::Display for SubResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubResult {
    type Err = ParseSubResultError;

    /// Accepts `2x0` as well as `2-0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "x").as_str() {
            "0x0" => Ok(SubResult::ZeroZero),
            "1x1" => Ok(SubResult::OneOne),
            "1x0" => Ok(SubResult::OneZero),
            "2x0" => Ok(SubResult::TwoZero),
            "2x1" => Ok(SubResult::TwoOne),
            _ => Err(ParseSubResultError(s.to_string())),
        }
    }
}

/// Outcome state of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// No result reported yet
    Pending,
    Draw,
    Player1Won,
    Player2Won,
}

impl MatchOutcome {
    /// Whether a result has been reported
    pub fn is_recorded(self) -> bool {
        self != MatchOutcome::Pending
    }

    /// Storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            MatchOutcome::Pending => "pending",
            MatchOutcome::Draw => "draw",
            MatchOutcome::Player1Won => "player1_won",
            MatchOutcome::Player2Won => "player2_won",
        }
    }

    /// Parse the storage representation. Unknown values read as `Pending`.
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "draw" => MatchOutcome::Draw,
            "player1_won" => MatchOutcome::Player1Won,
            "player2_won" => MatchOutcome::Player2Won,
            _ => MatchOutcome::Pending,
        }
    }
}

/// A player enrolled in one tournament, with their cumulative ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player ID
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Total points: 3 per win, 1 per draw, plus the sub-score bonus
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Set once the player has been granted a bye
    pub had_bye: bool,
    /// Best-of-3 shapes of the matches this player won, in order
    pub sub_results: Vec<SubResult>,
}

impl Player {
    /// Create a player with an empty ledger
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            points: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            had_bye: false,
            sub_results: Vec::new(),
        }
    }

    pub fn register_win(&mut self) {
        self.wins += 1;
        self.points += 3;
    }

    pub fn register_draw(&mut self) {
        self.draws += 1;
        self.points += 1;
    }

    pub fn register_loss(&mut self) {
        self.losses += 1;
    }

    /// Append a best-of-3 shape to the history
    pub fn add_sub_result(&mut self, result: SubResult) {
        self.sub_results.push(result);
    }

    /// Grant a bye: an automatic win, remembered so the player is not
    /// favoured for another one.
    pub fn grant_bye(&mut self) {
        self.register_win();
        self.had_bye = true;
    }

    /// Sum of the sub-score bonus over the whole history
    pub fn sub_score(&self) -> u32 {
        self.sub_results.iter().map(|r| r.bonus()).sum()
    }

    /// Clear the ledger, keeping identity
    pub fn reset_ledger(&mut self) {
        self.points = 0;
        self.wins = 0;
        self.losses = 0;
        self.draws = 0;
        self.had_bye = false;
        self.sub_results.clear();
    }
}

/// A pairing of two players within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Match ID
    pub id: MatchId,
    /// Number of the round this match belongs to
    pub round_number: u32,
    pub player1: PlayerId,
    pub player2: PlayerId,
    pub outcome: MatchOutcome,
    /// Best-of-3 shape, present once a result is recorded
    pub sub_result: Option<SubResult>,
    /// Winner, present only for `Player1Won` / `Player2Won`
    pub winner: Option<PlayerId>,
}

impl Match {
    /// Create a pending match
    pub fn new(round_number: u32, player1: PlayerId, player2: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round_number,
            player1,
            player2,
            outcome: MatchOutcome::Pending,
            sub_result: None,
            winner: None,
        }
    }

    /// Whether the player takes part in this match
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == player
    }

    /// Whether this match pairs `a` with `b`, in either seat order
    pub fn is_between(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.player1 == a && self.player2 == b) || (self.player1 == b && self.player2 == a)
    }

    /// Derive the outcome from a reported winner.
    ///
    /// No winner means a draw. A winner that is neither participant is
    /// rejected with [`TournamentError::InvalidWinner`].
    pub fn outcome_for_winner(&self, winner: Option<PlayerId>) -> TournamentResult<MatchOutcome> {
        match winner {
            None => Ok(MatchOutcome::Draw),
            Some(id) if id == self.player1 => Ok(MatchOutcome::Player1Won),
            Some(id) if id == self.player2 => Ok(MatchOutcome::Player2Won),
            Some(_) => Err(TournamentError::InvalidWinner(self.id)),
        }
    }
}

/// One scheduling cycle of a tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Round ID
    pub id: RoundId,
    /// Round number (1-indexed)
    pub number: u32,
    /// Matches created together with the round
    pub matches: Vec<Match>,
    /// Player granted a bye in this round. Byes are not matches.
    pub bye: Option<PlayerId>,
}

impl Round {
    /// Create an empty round
    pub fn new(number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            matches: Vec::new(),
            bye: None,
        }
    }

    /// Whether every match in the round has a result
    pub fn is_complete(&self) -> bool {
        self.matches.iter().all(|m| m.outcome.is_recorded())
    }
}

/// Tournament configuration supplied at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Tournament name
    pub name: String,
    /// Scheduled start
    pub starts_at: DateTime<Utc>,
    /// Planned duration in seconds
    pub duration_secs: u32,
}

impl TournamentConfig {
    pub fn new(name: impl Into<String>, starts_at: DateTime<Utc>, duration_secs: u32) -> Self {
        Self {
            name: name.into(),
            starts_at,
            duration_secs,
        }
    }
}

/// Full tournament snapshot: roster, rounds and match history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    /// Tournament ID
    pub id: TournamentId,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub duration_secs: u32,
    /// One-way flag set when the organizer closes the tournament
    pub is_finalized: bool,
    /// Players in enrollment order
    pub players: Vec<Player>,
    /// Rounds in creation order
    pub rounds: Vec<Round>,
}

impl Tournament {
    /// Create an empty tournament
    pub fn new(id: TournamentId, config: TournamentConfig) -> Self {
        Self {
            id,
            name: config.name,
            starts_at: config.starts_at,
            duration_secs: config.duration_secs,
            is_finalized: false,
            players: Vec::new(),
            rounds: Vec::new(),
        }
    }

    /// Scheduled end of the tournament
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.starts_at + Duration::seconds(i64::from(self.duration_secs))
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Every match of every round, in creation order
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    pub fn find_match(&self, id: MatchId) -> Option<&Match> {
        self.matches().find(|m| m.id == id)
    }

    pub fn find_match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.rounds
            .iter_mut()
            .flat_map(|r| r.matches.iter_mut())
            .find(|m| m.id == id)
    }

    pub fn find_round(&self, id: RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == id)
    }

    /// Number the next round would get
    pub fn next_round_number(&self) -> u32 {
        self.rounds.len() as u32 + 1
    }

    /// Rounds this roster requires
    pub fn max_rounds(&self) -> u32 {
        required_rounds(self.players.len())
    }

    /// All required rounds exist and every match has a result
    pub fn is_complete(&self) -> bool {
        !self.rounds.is_empty()
            && self.rounds.len() as u32 >= self.max_rounds()
            && self.rounds.iter().all(Round::is_complete)
    }

    /// Enroll new players.
    ///
    /// # Errors
    ///
    /// * `TournamentError::AlreadyFinalized` - Tournament is closed
    /// * `TournamentError::EnrollmentClosed` - Round 1 already exists
    pub fn enroll<I, S>(&mut self, names: I) -> TournamentResult<Vec<Player>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.is_finalized {
            return Err(TournamentError::AlreadyFinalized(self.id));
        }
        if !self.rounds.is_empty() {
            return Err(TournamentError::EnrollmentClosed(self.id));
        }

        let enrolled: Vec<Player> = names.into_iter().map(Player::new).collect();
        self.players.extend(enrolled.iter().cloned());
        Ok(enrolled)
    }
}

/// Tournament listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentInfo {
    /// Tournament ID
    pub id: TournamentId,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub duration_secs: u32,
    pub is_finalized: bool,
    /// Enrolled players
    pub player_count: usize,
    /// Rounds created so far
    pub round_count: usize,
    /// Rounds the roster requires
    pub max_rounds: u32,
}

impl From<&Tournament> for TournamentInfo {
    fn from(tournament: &Tournament) -> Self {
        Self {
            id: tournament.id,
            name: tournament.name.clone(),
            starts_at: tournament.starts_at,
            duration_secs: tournament.duration_secs,
            is_finalized: tournament.is_finalized,
            player_count: tournament.players.len(),
            round_count: tournament.rounds.len(),
            max_rounds: tournament.max_rounds(),
        }
    }
}

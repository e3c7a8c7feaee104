//! Tournament manager: runs engine operations against a repository.
//!
//! Each write loads the tournament snapshot, applies one engine operation and
//! persists the result in a single repository call. Writers on the same
//! tournament are serialized by a per-tournament lock; repositories also
//! reject a round whose number is already taken, and the manager retries
//! that case against a fresh snapshot.

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    Match, MatchId, Player, PlayerId, Round, RoundId, SubResult, Tournament, TournamentConfig,
    TournamentId, TournamentInfo,
};
use super::pairing::{self, ByeSelector, RandomByeSelector};
use super::results;
use super::standings::{self, Standing};
use crate::config::ManagerConfig;
use crate::db::TournamentRepository;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    /// Snapshot storage
    repository: Arc<dyn TournamentRepository>,

    /// Round 1 bye selection
    bye_selector: Arc<dyn ByeSelector>,

    config: ManagerConfig,

    /// One writer lock per tournament
    locks: Arc<Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>>,
}

impl TournamentManager {
    /// Create a manager with random round 1 byes and default settings
    pub fn new(repository: Arc<dyn TournamentRepository>) -> Self {
        Self {
            repository,
            bye_selector: Arc::new(RandomByeSelector),
            config: ManagerConfig::default(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Replace the bye selector
    pub fn with_bye_selector(mut self, bye_selector: Arc<dyn ByeSelector>) -> Self {
        self.bye_selector = bye_selector;
        self
    }

    /// Replace the settings
    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    async fn lock(&self, id: TournamentId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Drop locks nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Create a new tournament
    pub async fn create_tournament(
        &self,
        config: TournamentConfig,
    ) -> TournamentResult<TournamentId> {
        let id = self.repository.create_tournament(&config).await?;
        log::info!("Created tournament {} '{}'", id, config.name);
        Ok(id)
    }

    /// Enroll players before round 1
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotFound` - Unknown tournament
    /// * `TournamentError::EnrollmentClosed` - Round 1 already exists
    /// * `TournamentError::AlreadyFinalized` - Tournament is closed
    pub async fn enroll_players(
        &self,
        id: TournamentId,
        names: Vec<String>,
    ) -> TournamentResult<Vec<Player>> {
        let _guard = self.lock(id).await;
        let mut tournament = self.get_tournament(id).await?;

        let enrolled = tournament.enroll(names)?;
        self.repository.save_players(id, &enrolled).await?;

        log::info!(
            "Tournament {}: enrolled {} player(s), roster is now {}",
            id,
            enrolled.len(),
            tournament.players.len()
        );
        Ok(enrolled)
    }

    /// Get a tournament snapshot
    pub async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.repository
            .load_tournament(id)
            .await?
            .ok_or(TournamentError::NotFound(id))
    }

    /// List all tournaments
    pub async fn list_tournaments(&self) -> TournamentResult<Vec<TournamentInfo>> {
        self.repository.list_tournaments().await
    }

    /// Get a match by ID
    pub async fn get_match(&self, match_id: MatchId) -> TournamentResult<Match> {
        let id = self
            .repository
            .find_tournament_by_match(match_id)
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        let tournament = self.get_tournament(id).await?;
        tournament
            .find_match(match_id)
            .cloned()
            .ok_or(TournamentError::MatchNotFound(match_id))
    }

    /// Get a round by ID
    pub async fn get_round(&self, round_id: RoundId) -> TournamentResult<Round> {
        let id = self
            .repository
            .find_tournament_by_round(round_id)
            .await?
            .ok_or(TournamentError::RoundNotFound(round_id))?;
        let tournament = self.get_tournament(id).await?;
        tournament
            .find_round(round_id)
            .cloned()
            .ok_or(TournamentError::RoundNotFound(round_id))
    }

    /// Create and persist the next round
    ///
    /// # Errors
    ///
    /// * `TournamentError::NoPlayers` - Empty roster
    /// * `TournamentError::RoundLimitReached` - All required rounds exist
    /// * `TournamentError::ConcurrentModification` - Lost the race more often
    ///   than `max_round_retries`
    pub async fn start_round(&self, id: TournamentId) -> TournamentResult<Round> {
        let _guard = self.lock(id).await;
        let mut attempt = 0;

        loop {
            let mut tournament = self.get_tournament(id).await?;
            let round = pairing::create_round(&mut tournament, self.bye_selector.as_ref())?;

            match self.repository.save_round(id, &round).await {
                Ok(()) => return Ok(round),
                Err(TournamentError::ConcurrentModification(_))
                    if attempt < self.config.max_round_retries =>
                {
                    attempt += 1;
                    log::warn!(
                        "Tournament {}: round {} was taken concurrently, retrying ({}/{})",
                        id,
                        round.number,
                        attempt,
                        self.config.max_round_retries
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Record a match result.
    ///
    /// The outcome is derived from `winner`: `None` is a draw, otherwise the
    /// winner must be one of the two participants.
    ///
    /// # Errors
    ///
    /// * `TournamentError::MatchNotFound` - Unknown match
    /// * `TournamentError::InvalidWinner` - Winner did not play the match
    pub async fn record_result(
        &self,
        match_id: MatchId,
        sub_result: SubResult,
        winner: Option<PlayerId>,
    ) -> TournamentResult<Match> {
        let id = self
            .repository
            .find_tournament_by_match(match_id)
            .await?
            .ok_or(TournamentError::MatchNotFound(match_id))?;

        let _guard = self.lock(id).await;
        let mut tournament = self.get_tournament(id).await?;

        let outcome = tournament
            .find_match(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?
            .outcome_for_winner(winner)?;
        let recorded =
            results::record_result(&mut tournament, match_id, sub_result, outcome, winner)?;

        self.repository.save_result(id, &recorded).await?;
        Ok(recorded)
    }

    /// Mark the tournament finalized. Finalizing twice is a no-op.
    pub async fn finalize_tournament(&self, id: TournamentId) -> TournamentResult<()> {
        let _guard = self.lock(id).await;
        let tournament = self.get_tournament(id).await?;
        if tournament.is_finalized {
            return Ok(());
        }

        if !tournament.is_complete() {
            log::warn!(
                "Tournament {}: finalized with {}/{} rounds or unrecorded matches",
                id,
                tournament.rounds.len(),
                tournament.max_rounds()
            );
        }

        self.repository.set_finalized(id).await?;
        log::info!("Tournament {} finalized", id);
        Ok(())
    }

    /// Determine the tournament winner
    pub async fn determine_winner(&self, id: TournamentId) -> TournamentResult<Option<Player>> {
        let tournament = self.get_tournament(id).await?;
        Ok(standings::determine_winner(&tournament).cloned())
    }

    /// Ranked standings table
    pub async fn standings(&self, id: TournamentId) -> TournamentResult<Vec<Standing>> {
        let tournament = self.get_tournament(id).await?;
        Ok(standings::standings(&tournament))
    }

    /// Whether two players have already been paired in this tournament
    pub async fn have_played(
        &self,
        id: TournamentId,
        a: PlayerId,
        b: PlayerId,
    ) -> TournamentResult<bool> {
        let tournament = self.get_tournament(id).await?;
        Ok(pairing::have_played(a, b, tournament.matches()))
    }

    /// Rounds the current roster requires
    pub async fn required_rounds_for(&self, id: TournamentId) -> TournamentResult<u32> {
        Ok(self.get_tournament(id).await?.max_rounds())
    }
}

//! In-memory `TournamentRepository` for tests and single-process use.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::repository::TournamentRepository;
use crate::tournament::{
    Match, MatchId, Player, Round, RoundId, Tournament, TournamentConfig, TournamentError,
    TournamentId, TournamentInfo, TournamentResult, rebuild_ledgers,
};

#[derive(Debug, Default)]
struct MemoryState {
    last_id: TournamentId,
    tournaments: HashMap<TournamentId, Tournament>,
}

impl MemoryState {
    fn get_mut(&mut self, id: TournamentId) -> TournamentResult<&mut Tournament> {
        self.tournaments
            .get_mut(&id)
            .ok_or(TournamentError::NotFound(id))
    }
}

/// Tournament snapshots held behind a single lock
#[derive(Debug, Default)]
pub struct InMemoryTournamentRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryTournamentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentRepository for InMemoryTournamentRepository {
    async fn create_tournament(&self, config: &TournamentConfig) -> TournamentResult<TournamentId> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let id = state.last_id;
        state
            .tournaments
            .insert(id, Tournament::new(id, config.clone()));
        Ok(id)
    }

    async fn load_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        Ok(self.state.read().await.tournaments.get(&id).cloned())
    }

    async fn list_tournaments(&self) -> TournamentResult<Vec<TournamentInfo>> {
        let state = self.state.read().await;
        let mut infos: Vec<TournamentInfo> =
            state.tournaments.values().map(TournamentInfo::from).collect();
        infos.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(infos)
    }

    async fn find_tournament_by_match(
        &self,
        match_id: MatchId,
    ) -> TournamentResult<Option<TournamentId>> {
        let state = self.state.read().await;
        Ok(state
            .tournaments
            .values()
            .find(|t| t.find_match(match_id).is_some())
            .map(|t| t.id))
    }

    async fn find_tournament_by_round(
        &self,
        round_id: RoundId,
    ) -> TournamentResult<Option<TournamentId>> {
        let state = self.state.read().await;
        Ok(state
            .tournaments
            .values()
            .find(|t| t.find_round(round_id).is_some())
            .map(|t| t.id))
    }

    async fn save_players(&self, id: TournamentId, players: &[Player]) -> TournamentResult<()> {
        let mut state = self.state.write().await;
        let tournament = state.get_mut(id)?;

        if tournament.is_finalized {
            return Err(TournamentError::AlreadyFinalized(id));
        }
        if !tournament.rounds.is_empty() {
            return Err(TournamentError::EnrollmentClosed(id));
        }

        for player in players {
            if tournament.player(player.id).is_none() {
                tournament.players.push(player.clone());
            }
        }
        Ok(())
    }

    async fn save_round(&self, id: TournamentId, round: &Round) -> TournamentResult<()> {
        let mut state = self.state.write().await;
        let tournament = state.get_mut(id)?;

        if tournament.is_finalized {
            return Err(TournamentError::AlreadyFinalized(id));
        }
        if tournament.next_round_number() != round.number {
            return Err(TournamentError::ConcurrentModification(id));
        }

        tournament.rounds.push(round.clone());
        rebuild_ledgers(tournament);
        Ok(())
    }

    async fn save_result(&self, id: TournamentId, game: &Match) -> TournamentResult<()> {
        let mut state = self.state.write().await;
        let tournament = state.get_mut(id)?;

        let stored = tournament
            .find_match_mut(game.id)
            .ok_or(TournamentError::MatchNotFound(game.id))?;
        *stored = game.clone();
        rebuild_ledgers(tournament);
        Ok(())
    }

    async fn set_finalized(&self, id: TournamentId) -> TournamentResult<()> {
        let mut state = self.state.write().await;
        state.get_mut(id)?.is_finalized = true;
        Ok(())
    }
}

//! Repository trait definitions for testability and dependency injection.
//!
//! The engine works on whole [`Tournament`] snapshots. A repository loads a
//! snapshot and persists the outcome of one engine operation as a single
//! unit: new players, a new round with its matches, or one recorded match.
//! Player ledgers always come from the stored history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Row};
use std::collections::HashMap;

use crate::tournament::{
    Match, MatchId, MatchOutcome, Player, Round, RoundId, SubResult, Tournament, TournamentConfig,
    TournamentError, TournamentId, TournamentInfo, TournamentResult, rebuild_ledgers,
    required_rounds,
};

/// Trait for tournament persistence.
///
/// Player ledgers are never taken from the caller: they are re-derived from
/// the stored rounds and matches, so a writer holding an outdated snapshot
/// cannot overwrite another writer's results.
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Create a tournament and return its ID
    async fn create_tournament(&self, config: &TournamentConfig) -> TournamentResult<TournamentId>;

    /// Load a full snapshot: roster in enrollment order, rounds, matches and
    /// ledgers derived from them
    async fn load_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>>;

    /// List all tournaments, newest first
    async fn list_tournaments(&self) -> TournamentResult<Vec<TournamentInfo>>;

    /// Find the tournament a match belongs to
    async fn find_tournament_by_match(
        &self,
        match_id: MatchId,
    ) -> TournamentResult<Option<TournamentId>>;

    /// Find the tournament a round belongs to
    async fn find_tournament_by_round(
        &self,
        round_id: RoundId,
    ) -> TournamentResult<Option<TournamentId>>;

    /// Add newly enrolled players.
    ///
    /// Fails with `TournamentError::EnrollmentClosed` once a round is stored
    /// and with `TournamentError::AlreadyFinalized` after finalization,
    /// whatever the caller's snapshot said.
    async fn save_players(&self, id: TournamentId, players: &[Player]) -> TournamentResult<()>;

    /// Persist a new round with its matches.
    ///
    /// Fails with `TournamentError::ConcurrentModification` unless the stored
    /// round count is exactly `round.number - 1`.
    async fn save_round(&self, id: TournamentId, round: &Round) -> TournamentResult<()>;

    /// Persist the result stored on a match
    async fn save_result(&self, id: TournamentId, game: &Match) -> TournamentResult<()>;

    /// Mark the tournament finalized
    async fn set_finalized(&self, id: TournamentId) -> TournamentResult<()>;
}

const SCHEMA: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS tournaments (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        starts_at TIMESTAMPTZ NOT NULL,
        duration_secs BIGINT NOT NULL,
        is_finalized BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tournament_players (
        id UUID PRIMARY KEY,
        tournament_id BIGINT NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
        seq BIGSERIAL,
        name TEXT NOT NULL,
        points INTEGER NOT NULL DEFAULT 0,
        wins INTEGER NOT NULL DEFAULT 0,
        losses INTEGER NOT NULL DEFAULT 0,
        draws INTEGER NOT NULL DEFAULT 0,
        had_bye BOOLEAN NOT NULL DEFAULT FALSE,
        sub_results JSONB NOT NULL DEFAULT '[]'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tournament_rounds (
        id UUID PRIMARY KEY,
        tournament_id BIGINT NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
        number INTEGER NOT NULL,
        bye_player_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (tournament_id, number)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tournament_matches (
        id UUID PRIMARY KEY,
        tournament_id BIGINT NOT NULL REFERENCES tournaments(id) ON DELETE CASCADE,
        round_id UUID NOT NULL REFERENCES tournament_rounds(id) ON DELETE CASCADE,
        round_number INTEGER NOT NULL,
        position INTEGER NOT NULL,
        player1_id UUID NOT NULL,
        player2_id UUID NOT NULL,
        outcome TEXT NOT NULL DEFAULT 'pending',
        sub_result TEXT,
        winner_id UUID
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_tournament_matches_tournament ON tournament_matches (tournament_id)",
    // Tables created before durations were widened
    "ALTER TABLE tournaments ALTER COLUMN duration_secs TYPE BIGINT",
];

/// PostgreSQL implementation of `TournamentRepository`.
///
/// Every write takes a row lock on the tournament, so writers from any
/// process are serialized. The ledger columns of `tournament_players` are
/// refreshed from the stored matches inside the same transaction; reads
/// re-derive ledgers and do not depend on them.
pub struct PgTournamentRepository {
    pool: PgPool,
}

fn duration_from_db(secs: i64) -> u32 {
    u32::try_from(secs).unwrap_or(u32::MAX)
}

impl PgTournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist
    pub async fn ensure_schema(&self) -> TournamentResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Lock the tournament row until the transaction ends.
    ///
    /// # Returns
    ///
    /// * `TournamentResult<bool>` - Whether the tournament is finalized
    async fn lock_tournament(conn: &mut PgConnection, id: TournamentId) -> TournamentResult<bool> {
        let row = sqlx::query("SELECT is_finalized FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(TournamentError::NotFound(id))?;
        Ok(row.get("is_finalized"))
    }

    async fn count_rounds(conn: &mut PgConnection, id: TournamentId) -> TournamentResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM tournament_rounds WHERE tournament_id = $1")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.get("count"))
    }

    /// Rewrite the ledger columns from the stored history
    async fn refresh_ledgers(conn: &mut PgConnection, id: TournamentId) -> TournamentResult<()> {
        let tournament = Self::load_snapshot(conn, id)
            .await?
            .ok_or(TournamentError::NotFound(id))?;

        for player in &tournament.players {
            sqlx::query(
                r#"
                UPDATE tournament_players
                SET points = $1, wins = $2, losses = $3, draws = $4, had_bye = $5, sub_results = $6
                WHERE id = $7
                "#,
            )
            .bind(player.points as i32)
            .bind(player.wins as i32)
            .bind(player.losses as i32)
            .bind(player.draws as i32)
            .bind(player.had_bye)
            .bind(serde_json::to_value(&player.sub_results)?)
            .bind(player.id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Read a tournament with its roster and history, then derive ledgers
    async fn load_snapshot(
        conn: &mut PgConnection,
        id: TournamentId,
    ) -> TournamentResult<Option<Tournament>> {
        let row = sqlx::query(
            "SELECT id, name, starts_at, duration_secs, is_finalized FROM tournaments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut tournament = Tournament {
            id: row.get("id"),
            name: row.get("name"),
            starts_at: row.get::<DateTime<Utc>, _>("starts_at"),
            duration_secs: duration_from_db(row.get("duration_secs")),
            is_finalized: row.get("is_finalized"),
            players: Self::load_players(conn, id).await?,
            rounds: Self::load_rounds(conn, id).await?,
        };
        rebuild_ledgers(&mut tournament);
        Ok(Some(tournament))
    }

    async fn load_players(conn: &mut PgConnection, id: TournamentId) -> TournamentResult<Vec<Player>> {
        let rows = sqlx::query(
            "SELECT id, name FROM tournament_players WHERE tournament_id = $1 ORDER BY seq",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut player = Player::new(row.get::<String, _>("name"));
                player.id = row.get("id");
                player
            })
            .collect())
    }

    async fn load_rounds(conn: &mut PgConnection, id: TournamentId) -> TournamentResult<Vec<Round>> {
        let round_rows = sqlx::query(
            "SELECT id, number, bye_player_id FROM tournament_rounds WHERE tournament_id = $1 ORDER BY number",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        let mut rounds: Vec<Round> = round_rows
            .into_iter()
            .map(|row| Round {
                id: row.get("id"),
                number: row.get::<i32, _>("number") as u32,
                matches: Vec::new(),
                bye: row.get("bye_player_id"),
            })
            .collect();
        let index: HashMap<RoundId, usize> =
            rounds.iter().enumerate().map(|(i, r)| (r.id, i)).collect();

        let match_rows = sqlx::query(
            r#"
            SELECT id, round_id, round_number, player1_id, player2_id, outcome, sub_result, winner_id
            FROM tournament_matches
            WHERE tournament_id = $1
            ORDER BY round_number, position
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        for row in match_rows {
            let round_id: RoundId = row.get("round_id");
            let Some(&idx) = index.get(&round_id) else {
                continue;
            };
            let outcome: String = row.get("outcome");
            let sub_result = row
                .get::<Option<String>, _>("sub_result")
                .map(|code| code.parse::<SubResult>())
                .transpose()
                .unwrap_or_else(|e| {
                    log::warn!("Ignoring stored sub-result: {}", e);
                    None
                });

            rounds[idx].matches.push(Match {
                id: row.get("id"),
                round_number: row.get::<i32, _>("round_number") as u32,
                player1: row.get("player1_id"),
                player2: row.get("player2_id"),
                outcome: MatchOutcome::from_db_str(&outcome),
                sub_result,
                winner: row.get("winner_id"),
            });
        }

        Ok(rounds)
    }
}

#[async_trait]
impl TournamentRepository for PgTournamentRepository {
    async fn create_tournament(&self, config: &TournamentConfig) -> TournamentResult<TournamentId> {
        let row = sqlx::query(
            "INSERT INTO tournaments (name, starts_at, duration_secs) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&config.name)
        .bind(config.starts_at)
        .bind(i64::from(config.duration_secs))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    async fn load_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        let mut conn = self.pool.acquire().await?;
        Self::load_snapshot(&mut *conn, id).await
    }

    async fn list_tournaments(&self) -> TournamentResult<Vec<TournamentInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.starts_at, t.duration_secs, t.is_finalized,
                   (SELECT COUNT(*) FROM tournament_players p WHERE p.tournament_id = t.id) AS player_count,
                   (SELECT COUNT(*) FROM tournament_rounds r WHERE r.tournament_id = t.id) AS round_count
            FROM tournaments t
            ORDER BY t.created_at DESC, t.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let player_count = row.get::<i64, _>("player_count") as usize;
                TournamentInfo {
                    id: row.get("id"),
                    name: row.get("name"),
                    starts_at: row.get::<DateTime<Utc>, _>("starts_at"),
                    duration_secs: duration_from_db(row.get("duration_secs")),
                    is_finalized: row.get("is_finalized"),
                    player_count,
                    round_count: row.get::<i64, _>("round_count") as usize,
                    max_rounds: required_rounds(player_count),
                }
            })
            .collect())
    }

    async fn find_tournament_by_match(
        &self,
        match_id: MatchId,
    ) -> TournamentResult<Option<TournamentId>> {
        let row = sqlx::query("SELECT tournament_id FROM tournament_matches WHERE id = $1")
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("tournament_id")))
    }

    async fn find_tournament_by_round(
        &self,
        round_id: RoundId,
    ) -> TournamentResult<Option<TournamentId>> {
        let row = sqlx::query("SELECT tournament_id FROM tournament_rounds WHERE id = $1")
            .bind(round_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("tournament_id")))
    }

    async fn save_players(&self, id: TournamentId, players: &[Player]) -> TournamentResult<()> {
        let mut tx = self.pool.begin().await?;

        if Self::lock_tournament(&mut *tx, id).await? {
            return Err(TournamentError::AlreadyFinalized(id));
        }
        if Self::count_rounds(&mut *tx, id).await? > 0 {
            return Err(TournamentError::EnrollmentClosed(id));
        }

        for player in players {
            sqlx::query("INSERT INTO tournament_players (id, tournament_id, name) VALUES ($1, $2, $3)")
                .bind(player.id)
                .bind(id)
                .bind(&player.name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn save_round(&self, id: TournamentId, round: &Round) -> TournamentResult<()> {
        let mut tx = self.pool.begin().await?;

        if Self::lock_tournament(&mut *tx, id).await? {
            return Err(TournamentError::AlreadyFinalized(id));
        }
        let stored = Self::count_rounds(&mut *tx, id).await?;
        if stored + 1 != i64::from(round.number) {
            return Err(TournamentError::ConcurrentModification(id));
        }

        sqlx::query(
            "INSERT INTO tournament_rounds (id, tournament_id, number, bye_player_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(round.id)
        .bind(id)
        .bind(round.number as i32)
        .bind(round.bye)
        .execute(&mut *tx)
        .await?;

        for (position, game) in round.matches.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO tournament_matches
                    (id, tournament_id, round_id, round_number, position, player1_id, player2_id, outcome)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(game.id)
            .bind(id)
            .bind(round.id)
            .bind(round.number as i32)
            .bind(position as i32)
            .bind(game.player1)
            .bind(game.player2)
            .bind(game.outcome.as_str())
            .execute(&mut *tx)
            .await?;
        }

        Self::refresh_ledgers(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn save_result(&self, id: TournamentId, game: &Match) -> TournamentResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::lock_tournament(&mut *tx, id).await?;

        let result = sqlx::query(
            r#"
            UPDATE tournament_matches
            SET outcome = $1, sub_result = $2, winner_id = $3
            WHERE id = $4 AND tournament_id = $5
            "#,
        )
        .bind(game.outcome.as_str())
        .bind(game.sub_result.map(|r| r.as_str()))
        .bind(game.winner)
        .bind(game.id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TournamentError::MatchNotFound(game.id));
        }

        Self::refresh_ledgers(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn set_finalized(&self, id: TournamentId) -> TournamentResult<()> {
        let result = sqlx::query("UPDATE tournaments SET is_finalized = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TournamentError::NotFound(id));
        }
        Ok(())
    }
}

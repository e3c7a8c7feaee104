//! Tournament storage.
//!
//! [`TournamentRepository`] is the seam between the engine and storage. It
//! is implemented for PostgreSQL, reached through a [`Database`] handle, and
//! for an in-process map used by tests and embedders without a database.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::tournament::TournamentResult;

pub mod config;
pub mod memory;
pub mod repository;

pub use config::DatabaseConfig;
pub use memory::InMemoryTournamentRepository;
pub use repository::{PgTournamentRepository, TournamentRepository};

/// Connected tournament store with its tables in place
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open the pool and create the tournament tables if they are missing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use swiss_tourney::db::{Database, DatabaseConfig};
    /// use swiss_tourney::tournament::TournamentManager;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    ///     let manager = TournamentManager::new(Arc::new(db.tournament_repository()));
    ///     println!("{} tournaments", manager.list_tournaments().await?.len());
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &DatabaseConfig) -> TournamentResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        let db = Self { pool };
        db.tournament_repository().ensure_schema().await?;
        Ok(db)
    }

    /// Repository sharing this pool
    pub fn tournament_repository(&self) -> PgTournamentRepository {
        PgTournamentRepository::new(self.pool.clone())
    }

    /// Wait for in-flight queries and close every connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn test_connect_prepares_tables() {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://postgres@localhost/swiss_tourney_test".to_string());
        let config = DatabaseConfig {
            max_connections: 2,
            min_connections: 1,
            ..DatabaseConfig::from_env_with_url(database_url)
        };

        let db = Database::connect(&config)
            .await
            .expect("Failed to connect to database");
        // A second pass over existing tables is a no-op
        db.tournament_repository()
            .ensure_schema()
            .await
            .expect("Schema creation failed");
        db.tournament_repository()
            .list_tournaments()
            .await
            .expect("Listing failed");
        db.close().await;
    }
}

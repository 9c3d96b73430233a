//! SQLite store backend.
//!
//! Uses a single SQLite database file with two tables:
//! - `profiles` — one row per external user, `external_id` UNIQUE
//! - `exchanges` — append-only log of user-message/bot-response pairs
//!
//! The uniqueness constraint on `external_id` is the arbitration point for
//! concurrent first-contact creates; a violated insert surfaces as
//! `StoreError::UniqueViolation` so the resolver can re-read once.

use async_trait::async_trait;
use chatrelay_core::error::StoreError;
use chatrelay_core::exchange::Exchange;
use chatrelay_core::profile::{ProfileId, UserProfile};
use chatrelay_core::store::ExchangeStore;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// A production SQLite store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store from a connection string.
    ///
    /// The database and all tables/indexes are created automatically.
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database
    /// (useful for tests).
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {url}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run schema migrations — creates tables and indexes.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id           TEXT PRIMARY KEY,
                external_id  TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL,
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("profiles table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS exchanges (
                id           TEXT PRIMARY KEY,
                profile_id   TEXT NOT NULL REFERENCES profiles(id),
                user_message TEXT NOT NULL,
                bot_response TEXT NOT NULL,
                created_at   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("exchanges table: {e}")))?;

        // Index for the recency-ordered history query
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_exchanges_profile_created
             ON exchanges(profile_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("exchanges index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Parse a `UserProfile` from a SQLite row.
    fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let external_id: String = row
            .try_get("external_id")
            .map_err(|e| StoreError::QueryFailed(format!("external_id column: {e}")))?;
        let display_name: String = row
            .try_get("display_name")
            .map_err(|e| StoreError::QueryFailed(format!("display_name column: {e}")))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;
        let updated_at: String = row
            .try_get("updated_at")
            .map_err(|e| StoreError::QueryFailed(format!("updated_at column: {e}")))?;

        Ok(UserProfile {
            id: ProfileId::from(&id),
            external_id,
            display_name,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    /// Parse an `Exchange` from a SQLite row.
    fn row_to_exchange(row: &sqlx::sqlite::SqliteRow) -> Result<Exchange, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let profile_id: String = row
            .try_get("profile_id")
            .map_err(|e| StoreError::QueryFailed(format!("profile_id column: {e}")))?;
        let user_message: String = row
            .try_get("user_message")
            .map_err(|e| StoreError::QueryFailed(format!("user_message column: {e}")))?;
        let bot_response: String = row
            .try_get("bot_response")
            .map_err(|e| StoreError::QueryFailed(format!("bot_response column: {e}")))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

        Ok(Exchange {
            id,
            profile_id: ProfileId::from(&profile_id),
            user_message,
            bot_response,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

// A row with a malformed timestamp fails the whole read; substituting a
// current timestamp would scramble chronological ordering.
fn parse_timestamp(s: &str) -> Result<chrono::DateTime<Utc>, StoreError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::QueryFailed(format!("timestamp {s:?}: {e}")))
}

#[async_trait]
impl ExchangeStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Ping failed: {e}")))?;
        Ok(())
    }

    async fn find_profile(&self, external_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query("SELECT * FROM profiles WHERE external_id = ?1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("SELECT profile: {e}")))?;

        match row {
            Some(ref r) => Ok(Some(Self::row_to_profile(r)?)),
            None => Ok(None),
        }
    }

    async fn create_profile(
        &self,
        external_id: &str,
        display_name: &str,
    ) -> Result<UserProfile, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO profiles (id, external_id, display_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(external_id)
        .bind(display_name)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::UniqueViolation(format!("external_id {external_id}: {db}"))
            }
            _ => StoreError::QueryFailed(format!("INSERT profile: {e}")),
        })?;

        debug!(external_id, "Created profile {id}");
        Ok(UserProfile {
            id: ProfileId::from(&id),
            external_id: external_id.into(),
            display_name: display_name.into(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_display_name(
        &self,
        id: &ProfileId,
        display_name: &str,
    ) -> Result<UserProfile, StoreError> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE profiles SET display_name = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(display_name)
        .bind(now.to_rfc3339())
        .bind(&id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("UPDATE profile: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("profile {id}")));
        }

        let row = sqlx::query("SELECT * FROM profiles WHERE id = ?1")
            .bind(&id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Re-read profile: {e}")))?;

        Self::row_to_profile(&row)
    }

    async fn recent_exchanges(
        &self,
        profile_id: &ProfileId,
        limit: usize,
    ) -> Result<Vec<Exchange>, StoreError> {
        // rowid tiebreak keeps same-timestamp rows in insertion order
        let rows = sqlx::query(
            "SELECT * FROM exchanges WHERE profile_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2",
        )
        .bind(&profile_id.0)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("SELECT exchanges: {e}")))?;

        rows.iter().map(Self::row_to_exchange).collect()
    }

    async fn append_exchange(
        &self,
        profile_id: &ProfileId,
        user_message: &str,
        bot_response: &str,
    ) -> Result<Exchange, StoreError> {
        let exchange = Exchange::new(profile_id.clone(), user_message, bot_response);

        sqlx::query(
            "INSERT INTO exchanges (id, profile_id, user_message, bot_response, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&exchange.id)
        .bind(&exchange.profile_id.0)
        .bind(&exchange.user_message)
        .bind(&exchange.bot_response)
        .bind(exchange.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("INSERT exchange: {e}")))?;

        debug!(profile_id = %profile_id, "Appended exchange {}", exchange.id);
        Ok(exchange)
    }

    async fn prune_exchanges(
        &self,
        profile_id: &ProfileId,
        keep: usize,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM exchanges WHERE profile_id = ?1 AND id NOT IN (
                 SELECT id FROM exchanges WHERE profile_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2
             )",
        )
        .bind(&profile_id.0)
        .bind(keep as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("DELETE exchanges: {e}")))?;

        Ok(result.rows_affected())
    }
}

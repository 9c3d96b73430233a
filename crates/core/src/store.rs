//! ExchangeStore trait — the abstraction over the persistent store.
//!
//! The store holds user profiles and their append-only exchange log.
//! Implementations: SQLite (production), in-memory (tests).
//!
//! The pipeline never serializes concurrent exchanges; the uniqueness
//! constraint on `external_id` is the only arbitration point for the
//! concurrent first-contact race (see `StoreError::UniqueViolation`).

use crate::error::StoreError;
use crate::exchange::Exchange;
use crate::profile::{ProfileId, UserProfile};
use async_trait::async_trait;

/// The storage collaborator surface.
#[async_trait]
pub trait ExchangeStore: Send + Sync {
    /// A human-readable name for this store (e.g., "sqlite").
    fn name(&self) -> &str;

    /// Cheap connectivity probe. `Ok(())` means the store answered.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Look up a profile by its external platform id.
    async fn find_profile(&self, external_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Create a new profile. Returns `StoreError::UniqueViolation` when a
    /// concurrent create for the same `external_id` won the race.
    async fn create_profile(
        &self,
        external_id: &str,
        display_name: &str,
    ) -> Result<UserProfile, StoreError>;

    /// Overwrite the display name of an existing profile. The id is stable.
    async fn update_display_name(
        &self,
        id: &ProfileId,
        display_name: &str,
    ) -> Result<UserProfile, StoreError>;

    /// The most recent `limit` exchanges for a profile, newest first.
    async fn recent_exchanges(
        &self,
        profile_id: &ProfileId,
        limit: usize,
    ) -> Result<Vec<Exchange>, StoreError>;

    /// Append one exchange to the profile's log.
    async fn append_exchange(
        &self,
        profile_id: &ProfileId,
        user_message: &str,
        bot_response: &str,
    ) -> Result<Exchange, StoreError>;

    /// Delete all but the newest `keep` exchanges for a profile.
    ///
    /// Only called when a history cap is explicitly configured; the
    /// exchange log is otherwise append-only. Returns the number of rows
    /// removed.
    async fn prune_exchanges(
        &self,
        profile_id: &ProfileId,
        keep: usize,
    ) -> Result<u64, StoreError>;
}

//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chatrelay_core::error::StoreError;
use chatrelay_core::exchange::Exchange;
use chatrelay_core::profile::{ProfileId, UserProfile};
use chatrelay_core::store::ExchangeStore;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    profiles: Vec<UserProfile>,
    exchanges: Vec<Exchange>,
}

/// An in-memory store backed by Vecs.
/// Enforces the same `external_id` uniqueness rule as the SQLite backend.
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Total number of stored exchanges (for test assertions).
    pub async fn exchange_count(&self) -> usize {
        self.inner.read().await.exchanges.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExchangeStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_profile(&self, external_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .profiles
            .iter()
            .find(|p| p.external_id == external_id)
            .cloned())
    }

    async fn create_profile(
        &self,
        external_id: &str,
        display_name: &str,
    ) -> Result<UserProfile, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.profiles.iter().any(|p| p.external_id == external_id) {
            return Err(StoreError::UniqueViolation(format!(
                "external_id {external_id}"
            )));
        }

        let now = Utc::now();
        let profile = UserProfile {
            id: ProfileId::new(),
            external_id: external_id.into(),
            display_name: display_name.into(),
            created_at: now,
            updated_at: now,
        };
        inner.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_display_name(
        &self,
        id: &ProfileId,
        display_name: &str,
    ) -> Result<UserProfile, StoreError> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .profiles
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {id}")))?;

        profile.display_name = display_name.into();
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn recent_exchanges(
        &self,
        profile_id: &ProfileId,
        limit: usize,
    ) -> Result<Vec<Exchange>, StoreError> {
        let inner = self.inner.read().await;
        let mut matching: Vec<Exchange> = inner
            .exchanges
            .iter()
            .filter(|e| &e.profile_id == profile_id)
            .cloned()
            .collect();
        // Insertion order is chronological; newest first for the caller
        matching.reverse();
        matching.truncate(limit);
        Ok(matching)
    }

    async fn append_exchange(
        &self,
        profile_id: &ProfileId,
        user_message: &str,
        bot_response: &str,
    ) -> Result<Exchange, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.profiles.iter().any(|p| &p.id == profile_id) {
            return Err(StoreError::QueryFailed(format!(
                "no such profile {profile_id}"
            )));
        }

        let exchange = Exchange::new(profile_id.clone(), user_message, bot_response);
        inner.exchanges.push(exchange.clone());
        Ok(exchange)
    }

    async fn prune_exchanges(
        &self,
        profile_id: &ProfileId,
        keep: usize,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let ids: Vec<String> = inner
            .exchanges
            .iter()
            .filter(|e| &e.profile_id == profile_id)
            .map(|e| e.id.clone())
            .collect();

        if ids.len() <= keep {
            return Ok(0);
        }

        let drop_ids: Vec<String> = ids[..ids.len() - keep].to_vec();
        inner.exchanges.retain(|e| !drop_ids.contains(&e.id));
        Ok(drop_ids.len() as u64)
    }
}

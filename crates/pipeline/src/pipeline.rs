//! The exchange orchestrator.
//!
//! One call to [`ExchangePipeline::handle`] runs the full linear state
//! machine: connectivity probe, identity resolution, history fetch, prompt
//! assembly, deadline-bounded completion, best-effort persistence. Every
//! path terminates in either the model's text or [`DEGRADED_REPLY`]; the
//! caller never sees an error.

use crate::prompt;
use chatrelay_core::completion::{CompletionClient, CompletionRequest};
use chatrelay_core::error::StoreError;
use chatrelay_core::exchange::Exchange;
use chatrelay_core::profile::ResolvedUser;
use chatrelay_core::store::ExchangeStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The fixed user-safe reply returned when the completion call fails.
pub const DEGRADED_REPLY: &str =
    "Sorry, I'm having trouble coming up with a reply right now. Please try again in a moment.";

/// Orchestrates one user-message/bot-response exchange end to end.
///
/// Holds no per-exchange state; concurrent calls are independent. The store
/// and the completion client are shared, externally-synchronized resources.
pub struct ExchangePipeline {
    store: Arc<dyn ExchangeStore>,
    client: Arc<dyn CompletionClient>,
    persona: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    history_limit: usize,
    history_cap: Option<usize>,
}

impl ExchangePipeline {
    pub fn new(
        store: Arc<dyn ExchangeStore>,
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            client,
            persona: String::new(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: Some(500),
            history_limit: 10,
            history_cap: None,
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Cap on stored exchanges per user, trimmed best-effort after a
    /// successful append. `None` disables trimming.
    pub fn with_history_cap(mut self, cap: Option<usize>) -> Self {
        self.history_cap = cap;
        self
    }

    /// Map an external caller identity to a persisted profile, creating or
    /// updating as needed. Any store failure degrades to a placeholder.
    pub async fn resolve_user(&self, external_id: &str, display_name: &str) -> ResolvedUser {
        let found = match self.store.find_profile(external_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(external_id, error = %e, "Profile lookup failed, degrading to placeholder");
                return ResolvedUser::placeholder(external_id, display_name);
            }
        };

        match found {
            Some(profile) if profile.display_name == display_name => {
                ResolvedUser::Persisted(profile)
            }
            Some(profile) => {
                // Display name drifted; id stays stable across the update
                match self.store.update_display_name(&profile.id, display_name).await {
                    Ok(updated) => ResolvedUser::Persisted(updated),
                    Err(e) => {
                        warn!(
                            external_id,
                            error = %e,
                            "Display name update failed, degrading to placeholder"
                        );
                        ResolvedUser::placeholder(external_id, display_name)
                    }
                }
            }
            None => match self.store.create_profile(external_id, display_name).await {
                Ok(profile) => {
                    info!(external_id, profile_id = %profile.id, "Created new profile");
                    ResolvedUser::Persisted(profile)
                }
                Err(StoreError::UniqueViolation(_)) => {
                    // Concurrent first contact: another call created the row
                    // between our read and write. Re-read exactly once.
                    match self.store.find_profile(external_id).await {
                        Ok(Some(profile)) => ResolvedUser::Persisted(profile),
                        Ok(None) | Err(_) => {
                            warn!(
                                external_id,
                                "Re-read after unique violation missed, degrading to placeholder"
                            );
                            ResolvedUser::placeholder(external_id, display_name)
                        }
                    }
                }
                Err(e) => {
                    warn!(external_id, error = %e, "Profile creation failed, degrading to placeholder");
                    ResolvedUser::placeholder(external_id, display_name)
                }
            },
        }
    }

    /// Fetch the most recent exchanges for a user, oldest first.
    ///
    /// Placeholders never touch the store. Read failures degrade to an empty
    /// history; the exchange proceeds with less context.
    pub async fn recent_history(&self, user: &ResolvedUser) -> Vec<Exchange> {
        let Some(profile_id) = user.profile_id() else {
            return Vec::new();
        };

        match self.store.recent_exchanges(profile_id, self.history_limit).await {
            Ok(mut exchanges) => {
                // Store returns newest first; the prompt wants chronological
                exchanges.reverse();
                exchanges
            }
            Err(e) => {
                warn!(profile_id = %profile_id, error = %e, "History fetch failed, continuing without context");
                Vec::new()
            }
        }
    }

    /// Best-effort append of a completed exchange. No-op for placeholders;
    /// write failures are logged and absorbed.
    pub async fn record_exchange(&self, user: &ResolvedUser, user_message: &str, bot_response: &str) {
        let Some(profile_id) = user.profile_id() else {
            debug!("Skipping persistence for placeholder user");
            return;
        };

        if let Err(e) = self
            .store
            .append_exchange(profile_id, user_message, bot_response)
            .await
        {
            warn!(profile_id = %profile_id, error = %e, "Failed to persist exchange");
            return;
        }

        if let Some(cap) = self.history_cap {
            match self.store.prune_exchanges(profile_id, cap).await {
                Ok(0) => {}
                Ok(removed) => debug!(profile_id = %profile_id, removed, "Trimmed stored history"),
                Err(e) => warn!(profile_id = %profile_id, error = %e, "History trim failed"),
            }
        }
    }

    /// Run one full exchange and return the text to send back to the caller.
    pub async fn handle(&self, external_id: &str, display_name: &str, user_message: &str) -> String {
        match self.store.ping().await {
            Ok(()) => debug!("Store reachable"),
            Err(e) => warn!(error = %e, "Store unreachable, exchange will run degraded"),
        }

        let user = self.resolve_user(external_id, display_name).await;
        let history = self.recent_history(&user).await;
        let messages = prompt::assemble(&self.persona, &history, user_message);

        debug!(
            external_id,
            placeholder = user.is_placeholder(),
            history_len = history.len(),
            prompt_len = messages.len(),
            "Dispatching completion"
        );

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        match self.client.complete(request).await {
            Ok(response) => {
                self.record_exchange(&user, user_message, &response.content).await;
                response.content
            }
            Err(e) => {
                warn!(external_id, error = %e, "Completion failed, returning degraded reply");
                DEGRADED_REPLY.to_string()
            }
        }
    }
}

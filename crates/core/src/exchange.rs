//! Exchange domain type — one user-message/bot-response pair.
//!
//! Exchanges are append-only: the pipeline never mutates or deletes them.
//! Ordering is defined by `created_at`; the store adapter is responsible
//! for returning a consistent chronological order.

use crate::profile::ProfileId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single persisted exchange between a user and the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// Unique exchange id
    pub id: String,

    /// The persisted profile this exchange belongs to
    pub profile_id: ProfileId,

    /// What the user said
    pub user_message: String,

    /// What the bot answered
    pub bot_response: String,

    /// When the exchange was recorded
    pub created_at: DateTime<Utc>,
}

impl Exchange {
    /// Build a new exchange with a fresh id and the current timestamp.
    pub fn new(
        profile_id: ProfileId,
        user_message: impl Into<String>,
        bot_response: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            profile_id,
            user_message: user_message.into(),
            bot_response: bot_response.into(),
            created_at: Utc::now(),
        }
    }
}

//! User profile domain types.
//!
//! A `UserProfile` is the persisted mapping from an external platform's user
//! id to this system's internal record. When the store is unreachable the
//! resolver degrades to a `PlaceholderProfile` — an ephemeral stand-in that
//! is never written and carries no store-assigned id. The two cases are an
//! explicit tagged enum so every downstream stage branches exhaustively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned, stable identifier for a persisted profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub String);

impl ProfileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted user profile.
///
/// Invariants: `external_id` is globally unique; `id` never changes after
/// creation; `display_name` is overwritten whenever it drifts from the
/// caller-supplied value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Store-assigned id, stable for the lifetime of the profile
    pub id: ProfileId,

    /// The external platform's user id (unique)
    pub external_id: String,

    /// Last-seen display name for this user
    pub display_name: String,

    /// When the profile was first created
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

/// An ephemeral profile used only when the store is unreachable.
///
/// Never persisted; lives for the duration of one exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderProfile {
    pub external_id: String,
    pub display_name: String,
}

/// The outcome of identity resolution.
///
/// Downstream stages skip all persistence for the `Placeholder` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedUser {
    Persisted(UserProfile),
    Placeholder(PlaceholderProfile),
}

impl ResolvedUser {
    /// Degrade to a placeholder for the given caller identity.
    pub fn placeholder(external_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::Placeholder(PlaceholderProfile {
            external_id: external_id.into(),
            display_name: display_name.into(),
        })
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// The store-assigned profile id, if this user is persisted.
    pub fn profile_id(&self) -> Option<&ProfileId> {
        match self {
            Self::Persisted(p) => Some(&p.id),
            Self::Placeholder(_) => None,
        }
    }

    pub fn external_id(&self) -> &str {
        match self {
            Self::Persisted(p) => &p.external_id,
            Self::Placeholder(p) => &p.external_id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Persisted(p) => &p.display_name,
            Self::Placeholder(p) => &p.display_name,
        }
    }
}

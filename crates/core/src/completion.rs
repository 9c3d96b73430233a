//! CompletionClient trait — the abstraction over the remote completion API.
//!
//! A client takes an ordered sequence of role-tagged prompt entries plus a
//! model id and sampling parameters, and returns a single candidate
//! completion. No streaming, no partial results.

use crate::error::CompletionError;
use crate::message::PromptMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Substituted when the API returns a choice with absent or empty content.
pub const EMPTY_REPLY_FALLBACK: &str = "I'm not sure what to say to that...";

/// Configuration for one completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "deepseek/deepseek-chat-v3.1:free")
    pub model: String,

    /// The assembled prompt, oldest entry first
    pub messages: Vec<PromptMessage>,

    /// Sampling temperature (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a completion client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The first choice's text content (never empty — see
    /// [`EMPTY_REPLY_FALLBACK`])
    pub content: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics, when the API reports them
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core completion trait.
///
/// The pipeline calls `complete()` without knowing which backend is in use.
/// Deadline enforcement is layered on via a wrapping implementation rather
/// than baked into each client.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// A human-readable name for this client (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, CompletionError>;

    /// Health check — can we reach the API?
    async fn health_check(&self) -> std::result::Result<bool, CompletionError> {
        Ok(true)
    }
}

//! OpenAI-compatible completion client.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI, and any
//! endpoint exposing `/v1/chat/completions`. Non-streaming only — the
//! pipeline consumes exactly one candidate completion per call.

use async_trait::async_trait;
use chatrelay_core::completion::{
    CompletionClient, CompletionRequest, CompletionResponse, EMPTY_REPLY_FALLBACK, Usage,
};
use chatrelay_core::error::CompletionError;
use chatrelay_core::message::{PromptMessage, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An OpenAI-compatible completion client.
pub struct OpenAiCompatClient {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create a new OpenAI-compatible client.
    ///
    /// The reqwest-level timeout is a generous transport backstop; the
    /// per-call deadline is enforced by [`crate::DeadlineClient`].
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| CompletionError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Create an OpenRouter client (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>) -> Result<Self, CompletionError> {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key)
    }

    /// Create an OpenAI client (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Result<Self, CompletionError> {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Convert our PromptMessage types to API wire format.
    fn to_api_messages(messages: &[PromptMessage]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::System => "system".into(),
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                },
                content: Some(m.content.clone()),
            })
            .collect()
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "stream": false,
        });

        debug!(client = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return Err(CompletionError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Completion endpoint returned error");
            return Err(CompletionError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response
                .json()
                .await
                .map_err(|e| CompletionError::InvalidResponse(format!(
                    "Failed to parse response: {e}"
                )))?;

        // A missing first choice is treated the same as absent content:
        // the fixed fallback reply, as a successful result
        let content = match api_response.choices.into_iter().next() {
            Some(choice) => match choice.message.content {
                Some(text) if !text.trim().is_empty() => text,
                _ => EMPTY_REPLY_FALLBACK.to_string(),
            },
            None => EMPTY_REPLY_FALLBACK.to_string(),
        };

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(CompletionResponse {
            content,
            model: api_response.model,
            usage,
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, CompletionError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- API wire types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

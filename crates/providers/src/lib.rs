//! Completion API clients for chatrelay.
//!
//! `OpenAiCompatClient` speaks the `/chat/completions` wire format used by
//! OpenAI, OpenRouter, Ollama, and most hosted endpoints. `DeadlineClient`
//! wraps any client and enforces the per-call deadline race.

pub mod deadline;
pub mod openai_compat;

pub use deadline::DeadlineClient;
pub use openai_compat::OpenAiCompatClient;

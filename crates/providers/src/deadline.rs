//! Deadline wrapper — races a completion call against a fixed timer.
//!
//! First branch to settle wins; the loser is dropped. Dropping the losing
//! future is best-effort cancellation only: the remote request may keep
//! executing, but its result is never observed, surfaced, or persisted.

use async_trait::async_trait;
use chatrelay_core::completion::{CompletionClient, CompletionRequest, CompletionResponse};
use chatrelay_core::error::CompletionError;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// The reference deadline for one completion call.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(25);

/// A client that wraps another client and enforces a per-call deadline.
pub struct DeadlineClient {
    inner: Arc<dyn CompletionClient>,
    deadline: Duration,
}

impl DeadlineClient {
    /// Wrap a client with the default 25-second deadline.
    pub fn new(inner: Arc<dyn CompletionClient>) -> Self {
        Self::with_deadline(inner, DEFAULT_DEADLINE)
    }

    /// Wrap a client with a custom deadline.
    pub fn with_deadline(inner: Arc<dyn CompletionClient>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

#[async_trait]
impl CompletionClient for DeadlineClient {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, CompletionError> {
        tokio::select! {
            result = self.inner.complete(request) => result,
            _ = tokio::time::sleep(self.deadline) => {
                warn!(
                    client = %self.inner.name(),
                    deadline_secs = self.deadline.as_secs(),
                    "Completion deadline fired, discarding in-flight call"
                );
                Err(CompletionError::Timeout {
                    elapsed_secs: self.deadline.as_secs(),
                })
            }
        }
    }

    async fn health_check(&self) -> std::result::Result<bool, CompletionError> {
        self.inner.health_check().await
    }
}

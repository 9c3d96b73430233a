//! End-to-end exchange tests: real SQLite store, deadline-wrapped mock
//! client, full pipeline. No network.

use async_trait::async_trait;
use chatrelay_core::completion::{CompletionClient, CompletionRequest, CompletionResponse};
use chatrelay_core::error::CompletionError;
use chatrelay_core::store::ExchangeStore;
use chatrelay_pipeline::{DEGRADED_REPLY, ExchangePipeline};
use chatrelay_providers::DeadlineClient;
use chatrelay_store::SqliteStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock client with scripted replies and an optional artificial delay.
struct MockClient {
    replies: Mutex<Vec<String>>,
    delay: Duration,
    call_count: Mutex<usize>,
}

impl MockClient {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
            delay: Duration::ZERO,
            call_count: Mutex::new(0),
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            replies: Mutex::new(vec!["late".into()]),
            delay,
            call_count: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        *self.call_count.lock().unwrap() += 1;
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| "out of script".into());
        Ok(CompletionResponse {
            content,
            model: request.model,
            usage: None,
        })
    }
}

async fn sqlite_pipeline(
    client: Arc<dyn CompletionClient>,
) -> (ExchangePipeline, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::new("sqlite::memory:").await.unwrap());
    let pipeline = ExchangePipeline::new(store.clone(), client, "test-model")
        .with_persona("You are a test companion.");
    (pipeline, store)
}

#[tokio::test]
async fn full_conversation_round_trip() {
    let client = Arc::new(MockClient::new(&["hello", "goodbye"]));
    let (pipeline, store) = sqlite_pipeline(client.clone()).await;

    let first = pipeline.handle("u1", "Ann", "hi").await;
    assert_eq!(first, "hello");

    let second = pipeline.handle("u1", "Ann", "bye").await;
    assert_eq!(second, "goodbye");
    assert_eq!(client.calls(), 2);

    // Both exchanges landed under the same profile, chronological order
    let profile = store.find_profile("u1").await.unwrap().unwrap();
    let mut history = store.recent_exchanges(&profile.id, 10).await.unwrap();
    history.reverse();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].user_message, "hi");
    assert_eq!(history[0].bot_response, "hello");
    assert_eq!(history[1].user_message, "bye");
    assert_eq!(history[1].bot_response, "goodbye");
}

#[tokio::test]
async fn deadline_expiry_leaves_store_untouched() {
    let inner = Arc::new(MockClient::slow(Duration::from_secs(3600)));
    let client = Arc::new(DeadlineClient::with_deadline(
        inner.clone(),
        Duration::from_millis(30),
    ));
    let (pipeline, store) = sqlite_pipeline(client).await;

    let response = pipeline.handle("u1", "Ann", "hi").await;
    assert_eq!(response, DEGRADED_REPLY);

    // The profile was resolved before the completion, but no exchange row
    // was written and the late result was never observed
    let profile = store.find_profile("u1").await.unwrap().unwrap();
    let history = store.recent_exchanges(&profile.id, 10).await.unwrap();
    assert!(history.is_empty());
    assert_eq!(inner.calls(), 0);
}

#[tokio::test]
async fn renamed_user_keeps_identity_across_exchanges() {
    let client = Arc::new(MockClient::new(&["a", "b"]));
    let (pipeline, store) = sqlite_pipeline(client).await;

    pipeline.handle("u1", "Ann", "hi").await;
    pipeline.handle("u1", "Annie", "again").await;

    let profile = store.find_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.display_name, "Annie");

    let history = store.recent_exchanges(&profile.id, 10).await.unwrap();
    assert_eq!(history.len(), 2);
}

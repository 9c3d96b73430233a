pub mod chat;
pub mod history;
pub mod ping;
pub mod serve;

use chatrelay_config::AppConfig;
use chatrelay_pipeline::ExchangePipeline;
use chatrelay_providers::{DeadlineClient, OpenAiCompatClient};
use chatrelay_store::SqliteStore;
use std::sync::Arc;
use std::time::Duration;

/// Wire the full pipeline from config: SQLite store, deadline-bounded
/// completion client, orchestrator.
pub async fn build_pipeline(
    config: &AppConfig,
) -> Result<(ExchangePipeline, Arc<SqliteStore>), Box<dyn std::error::Error>> {
    let store = Arc::new(SqliteStore::new(&config.store.database).await?);

    let api_key = config.api_key.clone().unwrap_or_default();
    let client = OpenAiCompatClient::new("openrouter", &config.base_url, api_key)?;
    let client = Arc::new(DeadlineClient::with_deadline(
        Arc::new(client),
        Duration::from_secs(config.completion_timeout_secs),
    ));

    let pipeline = ExchangePipeline::new(store.clone(), client, &config.model)
        .with_persona(&config.persona)
        .with_temperature(config.temperature)
        .with_max_tokens(Some(config.max_tokens))
        .with_history_limit(config.history_limit)
        .with_history_cap(config.history_cap);

    Ok((pipeline, store))
}

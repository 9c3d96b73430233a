//! HTTP gateway for chatrelay.
//!
//! Exposes the liveness/status surface (`GET /health`, `GET /status`) and a
//! `POST /chat` webhook that drives one exchange through the pipeline. The
//! presence rotation task lives here too; it cycles a status string on its
//! own schedule, independent of the exchange pipeline.
//!
//! Built on Axum.

pub mod presence;

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;

use chatrelay_config::AppConfig;
use chatrelay_core::store::ExchangeStore;
use chatrelay_pipeline::ExchangePipeline;
use chatrelay_providers::{DeadlineClient, OpenAiCompatClient};
use chatrelay_store::SqliteStore;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: Arc<ExchangePipeline>,
    pub store: Arc<dyn ExchangeStore>,
    pub started: Instant,
    pub presence: Arc<RwLock<String>>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/chat", post(chat_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server, wiring the pipeline from config.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let store = Arc::new(SqliteStore::new(&config.store.database).await?);

    let api_key = config.api_key.clone().unwrap_or_default();
    let client = OpenAiCompatClient::new("openrouter", &config.base_url, api_key)?;
    let client = Arc::new(DeadlineClient::with_deadline(
        Arc::new(client),
        Duration::from_secs(config.completion_timeout_secs),
    ));

    let pipeline = Arc::new(
        ExchangePipeline::new(store.clone(), client, &config.model)
            .with_persona(&config.persona)
            .with_temperature(config.temperature)
            .with_max_tokens(Some(config.max_tokens))
            .with_history_limit(config.history_limit)
            .with_history_cap(config.history_cap),
    );

    let current = Arc::new(RwLock::new(
        config.presence.statuses.first().cloned().unwrap_or_default(),
    ));
    let _rotation = presence::spawn_rotation(config.presence.clone(), current.clone());

    let state = Arc::new(GatewayState {
        pipeline,
        store,
        started: Instant::now(),
        presence: current,
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    store: &'static str,
}

/// Liveness probe. Always 200; the store field reports reachability.
async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let store = match state.store.ping().await {
        Ok(()) => "reachable",
        Err(_) => "unreachable",
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started.elapsed().as_secs(),
        store,
    })
}

#[derive(Serialize)]
struct StatusResponse {
    service: &'static str,
    version: &'static str,
    uptime_secs: u64,
    presence: String,
}

async fn status_handler(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: "chatrelay",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started.elapsed().as_secs(),
        presence: state.presence.read().await.clone(),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    external_id: String,
    display_name: String,
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

/// Drive one exchange. The pipeline absorbs every failure mode, so this
/// handler always returns 200 with some text.
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
    info!(
        external_id = %payload.external_id,
        message_len = payload.message.len(),
        "Chat webhook received"
    );

    let response = state
        .pipeline
        .handle(&payload.external_id, &payload.display_name, &payload.message)
        .await;

    Json(ChatResponse { response })
}

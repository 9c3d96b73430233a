//! `chatrelay serve` — Start the HTTP gateway with presence rotation.

use chatrelay_config::AppConfig;

pub async fn run(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port {
        config.gateway.port = port;
    }

    println!(
        "  Starting gateway on {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("  Endpoints: GET /health, GET /status, POST /chat");

    chatrelay_gateway::start(config).await
}

//! `chatrelay ping` — Check storage connectivity.

use chatrelay_config::AppConfig;
use chatrelay_core::store::ExchangeStore;
use chatrelay_store::SqliteStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("  Store: {}", config.store.database);

    let store = match SqliteStore::new(&config.store.database).await {
        Ok(store) => store,
        Err(e) => {
            println!("  Status: UNREACHABLE ({e})");
            return Err(e.into());
        }
    };

    match store.ping().await {
        Ok(()) => {
            println!("  Status: OK");
            Ok(())
        }
        Err(e) => {
            println!("  Status: FAILED ({e})");
            Err(e.into())
        }
    }
}

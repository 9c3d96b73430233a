//! `chatrelay history` — Show recent exchanges for an external user id.

use chatrelay_config::AppConfig;
use chatrelay_core::store::ExchangeStore;
use chatrelay_store::SqliteStore;

pub async fn run(user: String, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = SqliteStore::new(&config.store.database).await?;

    let Some(profile) = store.find_profile(&user).await? else {
        println!("No profile found for external id '{user}'");
        return Ok(());
    };

    let mut exchanges = store.recent_exchanges(&profile.id, limit).await?;
    exchanges.reverse();

    if exchanges.is_empty() {
        println!("No exchanges recorded for {} ({user})", profile.display_name);
        return Ok(());
    }

    println!();
    println!("  History for {} ({user})", profile.display_name);
    println!();
    for exchange in &exchanges {
        println!("  [{}]", exchange.created_at.format("%Y-%m-%d %H:%M:%S"));
        println!("  User > {}", exchange.user_message);
        println!("  Bot  > {}", exchange.bot_response);
        println!();
    }

    Ok(())
}

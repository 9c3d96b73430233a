//! Presence rotation.
//!
//! A periodic task that cycles through configured status strings and
//! publishes the current one for `/status`. Runs on its own schedule and
//! never touches the exchange pipeline.

use chatrelay_config::PresenceConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawn the rotation task. Returns `None` when rotation is disabled or no
/// statuses are configured; the published string then stays fixed.
pub fn spawn_rotation(
    config: PresenceConfig,
    current: Arc<RwLock<String>>,
) -> Option<JoinHandle<()>> {
    if !config.enabled || config.statuses.is_empty() {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(config.interval_secs));
        let mut index = 0usize;
        loop {
            interval.tick().await;
            let status = &config.statuses[index % config.statuses.len()];
            debug!(status = %status, "Rotating presence");
            *current.write().await = status.clone();
            index += 1;
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(statuses: &[&str], interval_secs: u64) -> PresenceConfig {
        PresenceConfig {
            enabled: true,
            interval_secs,
            statuses: statuses.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn disabled_rotation_spawns_nothing() {
        let mut cfg = config(&["a"], 30);
        cfg.enabled = false;
        let current = Arc::new(RwLock::new("initial".to_string()));
        assert!(spawn_rotation(cfg, current.clone()).is_none());
        assert_eq!(*current.read().await, "initial");
    }

    #[tokio::test]
    async fn empty_statuses_spawn_nothing() {
        let cfg = config(&[], 30);
        let current = Arc::new(RwLock::new("initial".to_string()));
        assert!(spawn_rotation(cfg, current).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn rotation_cycles_through_statuses() {
        let cfg = config(&["one", "two", "three"], 30);
        let current = Arc::new(RwLock::new(String::new()));
        let handle = spawn_rotation(cfg, current.clone()).unwrap();

        // First tick fires immediately
        tokio::task::yield_now().await;
        assert_eq!(*current.read().await, "one");

        tokio::time::advance(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert_eq!(*current.read().await, "two");

        tokio::time::advance(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert_eq!(*current.read().await, "three");

        // Wraps around
        tokio::time::advance(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert_eq!(*current.read().await, "one");

        handle.abort();
    }
}

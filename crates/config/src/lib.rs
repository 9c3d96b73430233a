//! Configuration loading, validation, and management for chatrelay.
//!
//! Loads configuration from `~/.chatrelay/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.chatrelay/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every completion call
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Deadline for one completion call, in seconds
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,

    /// The fixed system-level behavioral instruction prepended to every prompt
    #[serde(default = "default_persona")]
    pub persona: String,

    /// How many past exchanges to include in the prompt
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Optional cap on stored exchanges per user. `None` = never trim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_cap: Option<usize>,

    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Presence rotation configuration
    #[serde(default)]
    pub presence: PresenceConfig,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "deepseek/deepseek-chat-v3.1:free".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    500
}
fn default_completion_timeout_secs() -> u64 {
    25
}
fn default_persona() -> String {
    "You are a concise, good-natured chat companion. Keep replies short and \
     conversational, stay consistent with the conversation so far, and never \
     break character."
        .into()
}
fn default_history_limit() -> usize {
    10
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("completion_timeout_secs", &self.completion_timeout_secs)
            .field("history_limit", &self.history_limit)
            .field("history_cap", &self.history_cap)
            .field("store", &self.store)
            .field("gateway", &self.gateway)
            .field("presence", &self.presence)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite connection string
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_database() -> String {
    "sqlite://chatrelay.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Presence rotation — the periodic status-string cycle shown on `/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_presence_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_statuses")]
    pub statuses: Vec<String>,
}

fn default_true() -> bool {
    true
}
fn default_presence_interval() -> u64 {
    30
}
fn default_statuses() -> Vec<String> {
    vec![
        "Listening...".into(),
        "Thinking out loud".into(),
        "Around, mostly".into(),
    ]
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_presence_interval(),
            statuses: default_statuses(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.chatrelay/config.toml).
    ///
    /// Environment variables always win over file-supplied values:
    /// - `CHATRELAY_API_KEY` (highest priority), then `OPENROUTER_API_KEY`,
    ///   then `OPENAI_API_KEY`
    /// - `CHATRELAY_MODEL` overrides the model
    /// - `DATABASE_URL` overrides the store connection string
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides from a lookup function. Env always wins.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("CHATRELAY_API_KEY")
            .or_else(|| var("OPENROUTER_API_KEY"))
            .or_else(|| var("OPENAI_API_KEY"))
        {
            self.api_key = Some(key);
        }

        if let Some(model) = var("CHATRELAY_MODEL") {
            self.model = model;
        }

        if let Some(url) = var("DATABASE_URL") {
            self.store.database = url;
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chatrelay")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.completion_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "completion_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "history_limit must be greater than 0".into(),
            ));
        }

        if self.presence.enabled && self.presence.statuses.is_empty() {
            return Err(ConfigError::ValidationError(
                "presence.statuses must not be empty when presence is enabled".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            completion_timeout_secs: default_completion_timeout_secs(),
            persona: default_persona(),
            history_limit: default_history_limit(),
            history_cap: None,
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
            presence: PresenceConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.completion_timeout_secs, 25);
        assert_eq!(config.history_limit, 10);
        assert!(config.history_cap.is_none());
        assert_eq!(config.gateway.port, 8080);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.presence.interval_secs, config.presence.interval_secs);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = AppConfig {
            completion_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn enabled_presence_requires_statuses() {
        let mut config = AppConfig::default();
        config.presence.statuses.clear();
        assert!(config.validate().is_err());

        config.presence.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().max_tokens, 500);
    }

    #[test]
    fn history_cap_parses_from_toml() {
        let config: AppConfig = toml::from_str("history_cap = 10").unwrap();
        assert_eq!(config.history_cap, Some(10));
    }

    #[test]
    fn env_api_key_overrides_file_value() {
        let mut config = AppConfig {
            api_key: Some("sk-from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env_overrides(|key| {
            (key == "OPENROUTER_API_KEY").then(|| "sk-from-env".to_string())
        });
        assert_eq!(config.api_key.as_deref(), Some("sk-from-env"));
    }

    #[test]
    fn env_overrides_respect_key_precedence() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            "CHATRELAY_API_KEY" => Some("sk-specific".to_string()),
            "OPENROUTER_API_KEY" => Some("sk-generic".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("sk-specific"));
    }

    #[test]
    fn absent_env_leaves_file_values() {
        let mut config = AppConfig {
            api_key: Some("sk-from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env_overrides(|_| None);
        assert_eq!(config.api_key.as_deref(), Some("sk-from-file"));
        assert_eq!(config.model, default_model());
    }

    #[test]
    fn env_model_and_database_override() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            "CHATRELAY_MODEL" => Some("other/model".to_string()),
            "DATABASE_URL" => Some("sqlite://other.db".to_string()),
            _ => None,
        });
        assert_eq!(config.model, "other/model");
        assert_eq!(config.store.database, "sqlite://other.db");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}

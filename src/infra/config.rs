// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::prompts::resolver::LoadErrorPolicy;
use crate::provider::retry::RetryConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub retry: RetryToml,

    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Endpoint settings for the OpenAI-compatible client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Name of the env var holding the bearer token. Local servers usually need none.
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/v1".into(),
            api_key_env: None,
            timeout_secs: 600,
        }
    }
}

impl ClientConfig {
    /// Resolve the API key from the configured env var, if any.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[retry]` section, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryToml {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_factor: f64,
    pub max_delay_ms: u64,
    pub jitter_fraction: f64,
}

impl Default for RetryToml {
    fn default() -> Self {
        let cfg = RetryConfig::default();
        Self {
            max_attempts: cfg.max_attempts,
            initial_delay_ms: cfg.initial_delay.as_millis() as u64,
            backoff_factor: cfg.backoff_factor,
            max_delay_ms: cfg.max_delay.as_millis() as u64,
            jitter_fraction: cfg.jitter_fraction,
        }
    }
}

impl RetryToml {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_factor: self.backoff_factor,
            max_delay: Duration::from_millis(self.max_delay_ms),
            jitter_fraction: self.jitter_fraction.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default)]
    pub on_load_error: LoadErrorPolicy,
}

impl Config {
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

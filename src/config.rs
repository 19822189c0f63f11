//! Runtime configuration: endpoints, credentials, polling cadence.
//!
//! Settings persist to a JSON file next to the binary; the completion API
//! key is taken from the environment only and never written to disk.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Environment variable holding the completion API key.
pub const API_KEY_VAR: &str = "BABYMONITOR_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// Live sensor document (GET)
    pub live_url: String,
    /// Tracking document with history plus live values (GET)
    pub tracking_url: String,
    /// OpenAI-compatible chat completions endpoint (POST)
    pub completion_url: String,
    /// Model id sent with every completion request
    pub model: String,
    /// Name of the monitored baby, embedded in prompts
    pub baby_name: String,
    pub live_interval_ms: u64,
    pub history_interval_ms: u64,
    pub check_interval_ms: u64,
    pub disconnect_after_ms: u64,
    /// Bearer token for the completion endpoint; environment-only.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            live_url:
                "https://eddydemo-f3fa8-default-rtdb.firebaseio.com/usuarios/001/bebes/bb000/babymonitor/seguimiento/tiemporeal_sensores.json"
                    .to_string(),
            tracking_url:
                "https://eddydemo-f3fa8-default-rtdb.firebaseio.com/usuarios/001/bebes/bb000/babymonitor/seguimiento.json"
                    .to_string(),
            completion_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            baby_name: "Ethan".to_string(),
            live_interval_ms: 2_000,
            history_interval_ms: 5_000,
            check_interval_ms: 1_000,
            disconnect_after_ms: 60_000,
            api_key: None,
        }
    }
}

impl MonitorConfig {
    pub fn live_interval(&self) -> Duration {
        Duration::from_millis(self.live_interval_ms)
    }

    pub fn history_interval(&self) -> Duration {
        Duration::from_millis(self.history_interval_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn disconnect_after(&self) -> Duration {
        Duration::from_millis(self.disconnect_after_ms)
    }

    /// Pull secrets from the environment (after `dotenv` has run).
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_VAR) {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the settings file, writing defaults first if it does not exist.
    pub async fn load(&self) -> Result<MonitorConfig> {
        if !self.path.exists() {
            let default = MonitorConfig::default();
            self.save(&default).await?;
            return Ok(default);
        }
        let content = fs::read_to_string(&self.path).await?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub async fn save(&self, config: &MonitorConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

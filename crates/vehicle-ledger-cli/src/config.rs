use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use vehicle_ledger_types::DEFAULT_EVENT_CAPACITY;

/// Top-level configuration for the vehicle ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Default log filter; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub log_json: bool,

    /// Capacity of the event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            event_capacity: default_event_capacity(),
        }
    }
}

impl LedgerConfig {
    /// Config file path within the state directory.
    pub fn config_path(state_dir: &Path) -> PathBuf {
        state_dir.join("config.toml")
    }

    /// Load config from disk. Returns default if not found.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = Self::config_path(state_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        let path = Self::config_path(state_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content).context("Failed to write config file")?;
        Ok(())
    }
}

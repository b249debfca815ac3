use crate::error::{VoiceError, VoiceResult};
use crate::recents::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Session
    pub silence_timeout_ms: u64,

    // Recent files
    pub recents_capacity: usize,
    pub recents_path: String,

    // Meta
    pub log_level: String,

    // Data
    pub voice_corrections: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            silence_timeout_ms: 1500,
            recents_capacity: DEFAULT_CAPACITY,
            recents_path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pagetalks/recents.json")
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),

            voice_corrections: HashMap::from([
                ("too".to_string(), "to".to_string()),
                ("won".to_string(), "one".to_string()),
                ("safe as".to_string(), "save as".to_string()),
                ("paige".to_string(), "page".to_string()),
                ("pager".to_string(), "page".to_string()),
            ]),
        }
    }
}

impl Config {
    /// Load config from file, or create default
    pub fn load() -> VoiceResult<Self> {
        Self::load_from(config_path())
    }

    /// Load config from a specific file
    pub fn load_from(config_path: PathBuf) -> VoiceResult<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                // Graceful degradation: log warning and use defaults
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                // Backup corrupt file for debugging
                let backup_path = config_path.with_extension("json.corrupt");
                let _ = std::fs::rename(&config_path, &backup_path);
                return Ok(Self::default());
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> VoiceResult<()> {
        self.save_to(config_path())
    }

    pub fn save_to(&self, config_path: PathBuf) -> VoiceResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> VoiceResult<()> {
        if self.silence_timeout_ms == 0 {
            return Err(VoiceError::Config(
                "silence_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.recents_capacity == 0 {
            return Err(VoiceError::Config(
                "recents_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    pub fn recents_path(&self) -> PathBuf {
        PathBuf::from(&self.recents_path)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pagetalks")
        .join("config.json")
}

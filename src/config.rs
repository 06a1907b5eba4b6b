use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `api_base`
pub const API_BASE_ENV: &str = "ALUMTRACE_API_BASE";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Remote API
    pub api_base: String,
    pub request_timeout_secs: u64,

    // Search
    pub debounce_ms: u64,
    /// Bonus for a matching graduation year. 0 keeps year out of scoring.
    pub year_weight: u32,
    pub page_size: usize,

    // Meta
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 10,
            debounce_ms: 350,
            year_weight: 0,
            page_size: 5,
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, or create default
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_path())?;
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config.api_base = base;
            }
        }
        Ok(config)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                // Graceful degradation: keep the broken file around and use defaults
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// API base with trailing slashes removed, e.g. `http://host:8000`
    pub fn api_base(&self) -> String {
        self.api_base.trim().trim_end_matches('/').to_string()
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("alumtrace")
        .join("config.json")
}

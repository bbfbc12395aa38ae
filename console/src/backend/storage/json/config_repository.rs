//! # Console Config Repository
//!
//! Settings for one console installation, kept as `console_config.yaml` at the
//! root of the data directory next to the collection documents.
//!
//! ## YAML Format
//!
//! ```yaml
//! api_base_url: "http://127.0.0.1:8000"
//! request_timeout_secs: 15
//! undo_window_secs: 20
//! watch_interval_ms: 1000
//! data_format_version: "1.0"
//! created_at: "2026-01-21T19:30:00Z"
//! updated_at: "2026-01-21T19:35:00Z"
//! ```
//!
//! A missing file is created with defaults on first load. The backend URL
//! can be overridden per process with `ARCADE_CONSOLE_API_URL` without
//! touching the file.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "console_config.yaml";

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "ARCADE_CONSOLE_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL of the arcade backend
    pub api_base_url: String,
    /// Per-request timeout for backend calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How long a destructive action stays undoable
    #[serde(default = "default_undo_window_secs")]
    pub undo_window_secs: u64,
    /// Poll interval of the storage watcher
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,
    /// Data format version for future migrations
    pub data_format_version: String,
    pub created_at: String,
    pub updated_at: String,
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_undo_window_secs() -> u64 {
    20
}

fn default_watch_interval_ms() -> u64 {
    1000
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
            undo_window_secs: default_undo_window_secs(),
            watch_interval_ms: default_watch_interval_ms(),
            data_format_version: "1.0".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl ConsoleConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn undo_window(&self) -> Duration {
        Duration::from_secs(self.undo_window_secs)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms.max(1))
    }

    /// Apply process-level overrides from the environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                info!("Backend URL overridden by {}: {}", API_URL_ENV, url);
                self.api_base_url = url.to_string();
            }
        }
        self
    }
}

/// Reads and writes [`ConsoleConfig`] in a data directory
#[derive(Debug, Clone)]
pub struct ConsoleConfigRepository {
    base_directory: PathBuf,
}

impl ConsoleConfigRepository {
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Self {
        Self {
            base_directory: base_directory.as_ref().to_path_buf(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_directory.join(CONFIG_FILE_NAME)
    }

    /// Load the config, creating the default file if it doesn't exist
    pub fn load_or_create(&self) -> Result<ConsoleConfig> {
        let config_path = self.config_path();

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: ConsoleConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Invalid console config in {}", config_path.display()))?;
            debug!("Loaded console config from {:?}", config_path);
            Ok(config)
        } else {
            let config = ConsoleConfig::default();
            self.save(&config)?;
            info!("Created default console config at {:?}", config_path);
            Ok(config)
        }
    }

    /// Save the config, stamping `updated_at`
    pub fn save(&self, config: &ConsoleConfig) -> Result<()> {
        if !self.base_directory.exists() {
            fs::create_dir_all(&self.base_directory)?;
            info!("Created base data directory: {:?}", self.base_directory);
        }

        let mut config = config.clone();
        config.updated_at = Utc::now().to_rfc3339();
        let yaml_content = serde_yaml::to_string(&config)?;

        let config_path = self.config_path();
        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved console config to {:?}", config_path);
        Ok(())
    }

    /// Point the console at a different backend
    pub fn set_api_base_url(&self, api_base_url: &str) -> Result<ConsoleConfig> {
        let mut config = self.load_or_create()?;
        config.api_base_url = api_base_url.trim().trim_end_matches('/').to_string();
        self.save(&config)?;
        info!("Backend URL set to {}", config.api_base_url);
        Ok(config)
    }
}

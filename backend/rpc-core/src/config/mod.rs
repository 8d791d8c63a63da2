//! Application configuration for the RPC core.
//!
//! Loaded once at startup from `{config_dir}/config.json`, validated, and
//! handed to the composition code by value. A missing file yields defaults;
//! a corrupted file is an error the shell decides how to handle.

use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSettings {
    /// Port for the broadcast WebSocket server; 0 selects an ephemeral port.
    #[serde(default = "default_broadcast_port")]
    pub broadcast_port: u16,

    /// Worker threads for the task runtime; 0 selects hardware concurrency.
    #[serde(default)]
    pub worker_threads: usize,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            broadcast_port: default_broadcast_port(),
            worker_threads: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Poll interval of the UI-affine loop, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Interval of the periodic `app.status` notification, in seconds.
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            status_interval_secs: default_status_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub rpc: RpcSettings,

    #[serde(default)]
    pub ui: UiSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            rpc: RpcSettings::default(),
            ui: UiSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_broadcast_port() -> u16 {
    crate::DEFAULT_BROADCAST_PORT
}
fn default_poll_interval_ms() -> u64 {
    16
}
fn default_status_interval_secs() -> u64 {
    30
}

impl AppConfig {
    /// Load config from `{config_dir}/config.json`.
    ///
    /// A missing file is not an error: defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read,
    /// parsed, or validated.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Read {
            location: ErrorLocation::here(),
            path: config_path.clone(),
            source: e,
        })?;

        let config: AppConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                location: ErrorLocation::here(),
                path: config_path.clone(),
                reason: e.to_string(),
            })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to `{config_dir}/config.json` using atomic write
    /// (temp file + rename, so a crash never leaves a torn file).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, or the write/rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Write {
            location: ErrorLocation::here(),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            location: ErrorLocation::here(),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::Write {
            location: ErrorLocation::here(),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::Write {
            location: ErrorLocation::here(),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::Validation {
                location: ErrorLocation::here(),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.ui.poll_interval_ms == 0 || self.ui.poll_interval_ms > 250 {
            return Err(ConfigError::Validation {
                location: ErrorLocation::here(),
                reason: format!(
                    "Invalid poll interval: {} ms (must be 1-250)",
                    self.ui.poll_interval_ms
                ),
            });
        }

        if self.notifications.status_interval_secs == 0 {
            return Err(ConfigError::Validation {
                location: ErrorLocation::here(),
                reason: String::from("Status interval must be at least 1 second"),
            });
        }

        if self.rpc.worker_threads > 512 {
            return Err(ConfigError::Validation {
                location: ErrorLocation::here(),
                reason: format!(
                    "Unreasonable worker thread count: {}",
                    self.rpc.worker_threads
                ),
            });
        }

        Ok(())
    }
}

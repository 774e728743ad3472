//! Main application configuration
//!
//! This module defines the primary configuration structures for the ladder
//! binary, including TOML file loading, environment overrides and validation.

use crate::config::ladder::LadderConfig;
use crate::error::LadderError;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub host: HostSettings,
    pub storage: StorageSettings,
    pub ladder: LadderConfig,
    pub metrics: MetricsSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Match-hosting API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Base URL of the Warzone API
    pub base_url: String,
    /// Host account email
    pub email: String,
    /// Host account API token
    pub api_token: String,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Prefix used in generated game titles
    pub game_name_prefix: String,
}

/// Location of the persisted JSON stores
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub players_file: String,
    pub active_games_file: String,
    pub history_file: String,
    pub templates_file: String,
}

/// Run metrics export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// Prometheus textfile written at the end of every run
    pub textfile_path: Option<PathBuf>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "ladder-referee".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.warzone.com/API".to_string(),
            email: String::new(),
            api_token: String::new(),
            request_timeout_seconds: 30,
            game_name_prefix: "Ladder".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            players_file: "players.json".to_string(),
            active_games_file: "active_games.json".to_string(),
            history_file: "history.json".to_string(),
            templates_file: "templates.json".to_string(),
        }
    }
}

impl StorageSettings {
    pub fn players_path(&self) -> PathBuf {
        self.data_dir.join(&self.players_file)
    }

    pub fn active_games_path(&self) -> PathBuf {
        self.data_dir.join(&self.active_games_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }

    pub fn templates_path(&self) -> PathBuf {
        self.data_dir.join(&self.templates_file)
    }
}

impl HostSettings {
    /// Per-request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Whether both credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.api_token.is_empty()
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| LadderError::ConfigurationError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let mut config: AppConfig =
            toml::from_str(&raw).map_err(|e| LadderError::ConfigurationError {
                message: format!("Failed to parse {}: {}", path.display(), e),
            })?;

        config.apply_env_overrides()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        // Service settings
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Host settings
        if let Ok(email) = env::var("WZ_EMAIL") {
            self.host.email = email;
        }
        if let Ok(token) = env::var("WZ_API_TOKEN") {
            self.host.api_token = token;
        }
        if let Ok(url) = env::var("WZ_API_URL") {
            self.host.base_url = url;
        }
        if let Ok(timeout) = env::var("WZ_REQUEST_TIMEOUT_SECONDS") {
            self.host.request_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid WZ_REQUEST_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Storage settings
        if let Ok(dir) = env::var("LADDER_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }

        // Ladder rules
        if let Ok(threshold) = env::var("STRIKE_THRESHOLD") {
            self.ladder.strike_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("Invalid STRIKE_THRESHOLD value: {}", threshold))?;
        }
        if let Ok(weeks) = env::var("MAX_COOLDOWN_WEEKS") {
            self.ladder.max_cooldown_weeks = weeks
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_COOLDOWN_WEEKS value: {}", weeks))?;
        }
        if let Ok(hours) = env::var("LOBBY_TIMEOUT_HOURS") {
            self.ladder.lobby_timeout_hours = hours
                .parse()
                .map_err(|_| anyhow!("Invalid LOBBY_TIMEOUT_HOURS value: {}", hours))?;
        }
        if let Ok(k) = env::var("ELO_K_FACTOR") {
            self.ladder.k_factor = k
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_K_FACTOR value: {}", k))?;
        }

        // Metrics
        if let Ok(path) = env::var("METRICS_TEXTFILE") {
            self.metrics.textfile_path = Some(PathBuf::from(path));
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate host settings
    if config.host.base_url.is_empty() {
        return Err(anyhow!("Match host base URL cannot be empty"));
    }
    if config.host.request_timeout_seconds == 0 {
        return Err(anyhow!("Request timeout must be greater than 0"));
    }

    // Validate storage settings
    let files = [
        &config.storage.players_file,
        &config.storage.active_games_file,
        &config.storage.history_file,
        &config.storage.templates_file,
    ];
    if files.iter().any(|name| name.is_empty()) {
        return Err(anyhow!("State file names cannot be empty"));
    }

    // Validate ladder rules
    if config.ladder.strike_threshold == 0 {
        return Err(anyhow!("Strike threshold must be greater than 0"));
    }
    if config.ladder.max_cooldown_weeks == 0 {
        return Err(anyhow!("Max cooldown must be at least one week"));
    }
    if config.ladder.lobby_timeout_hours <= 0 {
        return Err(anyhow!("Lobby timeout must be greater than 0"));
    }
    if config.ladder.k_factor <= 0.0 {
        return Err(anyhow!("Elo K-factor must be positive"));
    }

    Ok(())
}

//! Configuration management for the ladder
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values for both batch components.

pub mod app;
pub mod ladder;

// Re-export commonly used types
pub use app::{
    validate_config, AppConfig, HostSettings, MetricsSettings, ServiceSettings, StorageSettings,
};
pub use ladder::LadderConfig;

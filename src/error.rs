//! Error types for the ladder matchmaker and referee
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

use std::path::PathBuf;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ladder scenarios
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("Match host request failed: {message}")]
    HostRequestFailed { message: String },

    #[error("Match host rejected request: {message}")]
    HostRejected { message: String },

    #[error("Required state file missing: {}", path.display())]
    StateFileMissing { path: PathBuf },

    #[error("State file {} is corrupt: {reason}", path.display())]
    StateFileCorrupt { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

//! Ladder Referee - matchmaking and game refereeing for a ranked 1v1 Warzone ladder
//!
//! This crate pairs eligible players into games on the Warzone match host and
//! later resolves those games, updating Elo ratings and reliability strikes.
//! Both jobs are short batch runs over shared JSON state.

pub mod config;
pub mod error;
pub mod host;
pub mod matchmaker;
pub mod metrics;
pub mod rating;
pub mod referee;
pub mod service;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use host::{MatchHost, ScriptedMatchHost, WarzoneClient};
pub use matchmaker::Matchmaker;
pub use referee::Referee;
pub use service::LadderApp;
pub use storage::{InMemoryStateStore, JsonFileStore, StateStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

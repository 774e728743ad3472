//! Service layer for the ladder jobs
//!
//! Ties configuration, persisted state, the match host and run metrics
//! together into one call per batch command.

pub mod app;

pub use app::{LadderApp, MatchmakerReport, RefereeReport};

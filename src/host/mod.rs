//! Match-hosting service boundary
//!
//! This module defines the `MatchHost` trait, the canonical status types the
//! referee consumes, and the Warzone and scripted implementations.

pub mod client;
pub mod scripted;
pub mod status;
pub mod warzone;

// Re-export commonly used types
pub use client::MatchHost;
pub use scripted::ScriptedMatchHost;
pub use status::{GameState, GameStatus, PlayerState, SeatStatus};
pub use warzone::WarzoneClient;

#[cfg(test)]
pub use client::MockMatchHost;

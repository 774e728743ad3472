//! Rating and standings
//!
//! Elo updates for decided games (via the skillratings crate) and the
//! rank table used in game descriptions.

pub mod elo;
pub mod standings;

// Re-export commonly used types
pub use elo::{EloCalculator, EloUpdate};
pub use standings::{compute_ranks, rank_of, standings, Standing};

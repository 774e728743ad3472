//! Matchmaker
//!
//! Computes open slots per player, pairs them under the tiered rules and
//! opens the resulting games on the match host.

pub mod pairing;
pub mod runner;
pub mod slots;

// Re-export commonly used types
pub use pairing::{
    is_rematch, pair_across_pools, pair_pool, plan_pairings, Pairing, PairingPlan, PairingTier,
};
pub use runner::{MatchPlan, Matchmaker, MatchmakerRun, PlannedMatch};
pub use slots::{build_slot_pools, count_current_games, in_cooldown, last_assignment, SlotPools};

//! Referee
//!
//! Reconciles every active game against the status reported by the match
//! host, applies rating and strike changes, and archives finished games.

pub mod reconcile;
pub mod runner;
pub mod verdict;

// Re-export commonly used types
pub use reconcile::{reconcile, Observation, RefereeRun, RefereeSummary};
pub use runner::{Referee, RefereeOutcome};
pub use verdict::{adjudicate, Verdict};

//! Ladder rules configuration

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Tunables shared by the matchmaker and the referee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    /// Strike count at which a player becomes unreliable
    pub strike_threshold: u32,
    /// Upper bound on the unreliable-player cooldown, in weeks
    pub max_cooldown_weeks: u32,
    /// Age after which an unfilled lobby is abandoned
    pub lobby_timeout_hours: i64,
    /// Elo K-factor
    pub k_factor: f64,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            strike_threshold: 2,
            max_cooldown_weeks: 4,
            lobby_timeout_hours: 72,
            k_factor: 40.0,
        }
    }
}

impl LadderConfig {
    /// Mandatory rest before an unreliable player may be paired again
    pub fn cooldown_for(&self, missed_games: u32) -> Duration {
        let over = missed_games.saturating_sub(self.strike_threshold.saturating_sub(1));
        let weeks = over.max(1).min(self.max_cooldown_weeks);
        Duration::weeks(i64::from(weeks))
    }

    pub fn lobby_timeout(&self) -> Duration {
        Duration::hours(self.lobby_timeout_hours)
    }
}

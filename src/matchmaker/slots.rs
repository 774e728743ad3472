//! Slot construction
//!
//! Turns the player registry and the active-game list into two pools of
//! player IDs, one entry per open slot. A player with three open slots shows
//! up three times.

use crate::config::LadderConfig;
use crate::types::{ActiveGame, Player, PlayerId, PlayerRegistry};
use crate::utils::elapsed_since;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Open slots split by reliability tier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotPools {
    pub reliable: Vec<PlayerId>,
    pub unreliable: Vec<PlayerId>,
}

impl SlotPools {
    pub fn total(&self) -> usize {
        self.reliable.len() + self.unreliable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Number of active games each player is seated in
pub fn count_current_games(active_games: &[ActiveGame]) -> HashMap<&str, u32> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for game in active_games {
        for player_id in game.participants() {
            *counts.entry(player_id.as_str()).or_insert(0) += 1;
        }
    }
    counts
}

/// When the player was last paired: the stored stamp, else their newest active game
pub fn last_assignment(
    player_id: &str,
    player: &Player,
    active_games: &[ActiveGame],
) -> Option<DateTime<Utc>> {
    player.last_assigned_at.or_else(|| {
        active_games
            .iter()
            .filter(|game| game.involves(player_id))
            .map(|game| game.created_at)
            .max()
    })
}

/// Whether an unreliable player is still serving their cooldown
pub fn in_cooldown(
    player_id: &str,
    player: &Player,
    active_games: &[ActiveGame],
    config: &LadderConfig,
    now: DateTime<Utc>,
) -> bool {
    match last_assignment(player_id, player, active_games) {
        Some(last) => elapsed_since(last, now) < config.cooldown_for(player.missed_games),
        None => false,
    }
}

/// Build the reliable and unreliable slot pools for this run
pub fn build_slot_pools(
    players: &PlayerRegistry,
    active_games: &[ActiveGame],
    config: &LadderConfig,
    now: DateTime<Utc>,
) -> SlotPools {
    let counts = count_current_games(active_games);
    let mut pools = SlotPools::default();

    for (player_id, player) in players {
        let reliable = player.is_reliable(config.strike_threshold);

        if !reliable && in_cooldown(player_id, player, active_games, config, now) {
            debug!(
                "Player {} ({} strikes) is cooling down, no slots this run",
                player_id, player.missed_games
            );
            continue;
        }

        let current = counts.get(player_id.as_str()).copied().unwrap_or(0);
        let open = player
            .effective_cap(config.strike_threshold)
            .saturating_sub(current);
        if open == 0 {
            continue;
        }

        let pool = if reliable {
            &mut pools.reliable
        } else {
            &mut pools.unreliable
        };
        for _ in 0..open {
            pool.push(player_id.clone());
        }
    }

    pools
}

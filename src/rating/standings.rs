//! Ladder standings
//!
//! Ranks are only used for descriptive text (game descriptions, the
//! `standings` command). Pairing never looks at them.

use crate::types::{PlayerId, PlayerRegistry};
use std::collections::HashMap;

/// One row of the standings table
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub rank: u32,
    pub player_id: PlayerId,
    pub name: String,
    pub elo: f64,
    pub game_cap: u32,
    pub missed_games: u32,
}

/// Ranked players (game_cap > 0), highest elo first
pub fn standings(players: &PlayerRegistry) -> Vec<Standing> {
    let mut ranked: Vec<_> = players.iter().filter(|(_, p)| p.game_cap > 0).collect();
    ranked.sort_by(|a, b| {
        b.1.elo
            .partial_cmp(&a.1.elo)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, (id, player))| Standing {
            rank: index as u32 + 1,
            player_id: id.clone(),
            name: player.name.clone(),
            elo: player.elo,
            game_cap: player.game_cap,
            missed_games: player.missed_games,
        })
        .collect()
}

/// 1-based rank per player; withdrawn players are absent
pub fn compute_ranks(players: &PlayerRegistry) -> HashMap<PlayerId, u32> {
    standings(players)
        .into_iter()
        .map(|standing| (standing.player_id, standing.rank))
        .collect()
}

/// Rank of a player, 0 when unranked
pub fn rank_of(ranks: &HashMap<PlayerId, u32>, player_id: &str) -> u32 {
    ranks.get(player_id).copied().unwrap_or(0)
}

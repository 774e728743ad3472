//! Matchmaker run
//!
//! A run is split in two: `plan` is synchronous and owns all randomness,
//! `submit` creates the planned games one at a time and folds the results
//! back into the player and active-game state.

use crate::config::LadderConfig;
use crate::host::MatchHost;
use crate::matchmaker::pairing::{plan_pairings, Pairing, PairingTier};
use crate::matchmaker::slots::build_slot_pools;
use crate::rating::{compute_ranks, rank_of};
use crate::types::{
    ActiveGame, GameRequest, PlayerId, PlayerRegistry, Seat, Template,
};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// A pairing with its template chosen
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMatch {
    pub p1: PlayerId,
    pub p2: PlayerId,
    pub tier: PairingTier,
    pub template: Template,
}

/// What the planning step decided
#[derive(Debug, Clone)]
pub enum MatchPlan {
    /// Template pool is empty; nothing may be attempted or written
    NoTemplates,
    /// Matches to submit (possibly none)
    Ready {
        matches: Vec<PlannedMatch>,
        open_slots: usize,
        leftover_slots: usize,
    },
}

/// State after submitting a plan
#[derive(Debug, Clone)]
pub struct MatchmakerRun {
    pub players: PlayerRegistry,
    pub active_games: Vec<ActiveGame>,
    pub created: Vec<ActiveGame>,
    pub failed: Vec<PlannedMatch>,
    /// Some `last_assigned_at` changed and players must be written
    pub players_changed: bool,
}

/// Pairs eligible players and opens their games
#[derive(Debug, Clone)]
pub struct Matchmaker {
    config: LadderConfig,
    game_name_prefix: String,
}

impl Matchmaker {
    pub fn new(config: LadderConfig, game_name_prefix: impl Into<String>) -> Self {
        Self {
            config,
            game_name_prefix: game_name_prefix.into(),
        }
    }

    pub fn config(&self) -> &LadderConfig {
        &self.config
    }

    /// Build slot pools, pair them and pick a template per pairing
    pub fn plan<R: Rng + ?Sized>(
        &self,
        players: &PlayerRegistry,
        active_games: &[ActiveGame],
        templates: &[Template],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> MatchPlan {
        if templates.is_empty() {
            warn!("Template pool is empty, skipping matchmaking");
            return MatchPlan::NoTemplates;
        }

        let pools = build_slot_pools(players, active_games, &self.config, now);
        let open_slots = pools.total();
        info!(
            "Open slots: {} reliable, {} unreliable",
            pools.reliable.len(),
            pools.unreliable.len()
        );

        let plan = plan_pairings(pools, players, rng);
        let leftover_slots = plan.leftover.total();

        let matches = plan
            .pairings
            .into_iter()
            .filter_map(|Pairing { p1, p2, tier }| {
                let template = templates.choose(rng)?.clone();
                Some(PlannedMatch {
                    p1,
                    p2,
                    tier,
                    template,
                })
            })
            .collect::<Vec<_>>();

        info!(
            "Planned {} matches, {} slots left unfilled",
            matches.len(),
            leftover_slots
        );

        MatchPlan::Ready {
            matches,
            open_slots,
            leftover_slots,
        }
    }

    /// Create every planned game in order; failures are logged and skipped
    pub async fn submit(
        &self,
        host: &dyn MatchHost,
        mut players: PlayerRegistry,
        mut active_games: Vec<ActiveGame>,
        matches: Vec<PlannedMatch>,
        now: DateTime<Utc>,
    ) -> MatchmakerRun {
        let ranks = compute_ranks(&players);
        let mut created = Vec::new();
        let mut failed = Vec::new();
        let mut players_changed = false;

        for planned in matches {
            let request = self.game_request(&players, &ranks, &planned);
            info!(
                "Pairing {} vs {} ({}) on template {}",
                planned.p1, planned.p2, planned.tier, planned.template.id
            );

            match host.create_game(request).await {
                Ok(game_id) => {
                    info!("Game created: {}", game_id);
                    let game = ActiveGame {
                        game_id,
                        created_at: now,
                        p1_id: planned.p1.clone(),
                        p2_id: planned.p2.clone(),
                        template_id: planned.template.id,
                    };
                    active_games.push(game.clone());
                    created.push(game);

                    for player_id in [&planned.p1, &planned.p2] {
                        if let Some(player) = players.get_mut(player_id) {
                            player.last_assigned_at = Some(now);
                            players_changed = true;
                        }
                    }
                }
                Err(e) => {
                    error!(
                        "Failed to create game for {} vs {}: {}",
                        planned.p1, planned.p2, e
                    );
                    failed.push(planned);
                }
            }
        }

        MatchmakerRun {
            players,
            active_games,
            created,
            failed,
            players_changed,
        }
    }

    /// Title, description and seats for one planned match
    pub fn game_request(
        &self,
        players: &PlayerRegistry,
        ranks: &HashMap<PlayerId, u32>,
        planned: &PlannedMatch,
    ) -> GameRequest {
        let name1 = display_name(players, &planned.p1);
        let name2 = display_name(players, &planned.p2);

        GameRequest {
            template_id: planned.template.id,
            seats: vec![
                Seat {
                    player_id: planned.p1.clone(),
                    team: 0,
                },
                Seat {
                    player_id: planned.p2.clone(),
                    team: 1,
                },
            ],
            title: format!("{}: {} vs {}", self.game_name_prefix, name1, name2),
            description: format!(
                "Ranked 1v1 ladder game on {}.\n\n{} vs {}\n\nJoin within {} hours. Unjoined lobbies are cancelled and count as a missed game.",
                planned.template.name,
                describe_player(players, ranks, &planned.p1),
                describe_player(players, ranks, &planned.p2),
                self.config.lobby_timeout_hours,
            ),
        }
    }
}

fn display_name(players: &PlayerRegistry, player_id: &str) -> String {
    players
        .get(player_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| player_id.to_string())
}

fn describe_player(
    players: &PlayerRegistry,
    ranks: &HashMap<PlayerId, u32>,
    player_id: &str,
) -> String {
    let name = display_name(players, player_id);
    let rank = match rank_of(ranks, player_id) {
        0 => "unranked".to_string(),
        rank => format!("#{}", rank),
    };
    match players.get(player_id) {
        Some(player) => format!("{} ({}, {:.0} elo)", name, rank, player.elo),
        None => format!("{} ({})", name, rank),
    }
}

//! Common types used throughout the ladder
//!
//! Field names follow the persisted JSON stores, which the rendering
//! front-end reads directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable player identifier (numeric, kept as a string)
pub type PlayerId = String;

/// Identifier assigned to a game by the match host
pub type GameId = u64;

/// Identifier of a map/ruleset template on the match host
pub type TemplateId = u64;

/// Registered ladder player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub elo: f64,
    /// Maximum concurrent games accepted (0 = withdrawn)
    pub game_cap: u32,
    #[serde(default)]
    pub missed_games: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opponent: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_assigned_at: Option<DateTime<Utc>>,
    /// Fields owned by the registry that this crate passes through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Player {
    pub fn new(name: impl Into<String>, elo: f64, game_cap: u32) -> Self {
        Self {
            name: name.into(),
            elo,
            game_cap,
            missed_games: 0,
            last_opponent: None,
            last_assigned_at: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Whether the player is under the strike threshold
    pub fn is_reliable(&self, strike_threshold: u32) -> bool {
        self.missed_games < strike_threshold
    }

    /// Maximum concurrent games this player may hold right now
    pub fn effective_cap(&self, strike_threshold: u32) -> u32 {
        if self.is_reliable(strike_threshold) {
            self.game_cap
        } else {
            self.game_cap.min(1)
        }
    }

    /// Whether this player just faced `other`
    pub fn last_faced(&self, other: &str) -> bool {
        self.last_opponent.as_deref() == Some(other)
    }
}

/// All registered players keyed by ID
pub type PlayerRegistry = BTreeMap<PlayerId, Player>;

/// A match currently hosted by the external service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveGame {
    pub game_id: GameId,
    pub created_at: DateTime<Utc>,
    pub p1_id: PlayerId,
    pub p2_id: PlayerId,
    pub template_id: TemplateId,
}

impl ActiveGame {
    pub fn involves(&self, player_id: &str) -> bool {
        self.p1_id == player_id || self.p2_id == player_id
    }

    pub fn participants(&self) -> [&PlayerId; 2] {
        [&self.p1_id, &self.p2_id]
    }

    /// The other participant, if `player_id` is one of the two
    pub fn opponent_of(&self, player_id: &str) -> Option<&PlayerId> {
        if self.p1_id == player_id {
            Some(&self.p2_id)
        } else if self.p2_id == player_id {
            Some(&self.p1_id)
        } else {
            None
        }
    }
}

/// Archived result of a resolved game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub game_id: GameId,
    pub winner_id: Option<PlayerId>,
    pub loser_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p1_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p2_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub finished_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
}

pub const NOTE_LOBBY_TIMEOUT: &str = "Timed Out (Lobby)";
pub const NOTE_TERMINATED: &str = "Terminated";
pub const NOTE_DRAW: &str = "Draw";

/// Map/ruleset descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
}

/// Team assignment for one seat of a game request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub player_id: PlayerId,
    pub team: u8,
}

/// Everything the match host needs to open a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRequest {
    pub template_id: TemplateId,
    pub seats: Vec<Seat>,
    pub title: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_cap_throttles_unreliable() {
        let mut player = Player::new("alice", 1000.0, 3);
        assert_eq!(player.effective_cap(2), 3);

        player.missed_games = 2;
        assert!(!player.is_reliable(2));
        assert_eq!(player.effective_cap(2), 1);

        player.game_cap = 0;
        assert_eq!(player.effective_cap(2), 0);
    }

    #[test]
    fn test_player_round_trips_unknown_fields() {
        let raw = r#"{"name":"bob","elo":1012,"game_cap":2,"missed_games":1,"active":true}"#;
        let player: Player = serde_json::from_str(raw).unwrap();
        assert_eq!(player.elo, 1012.0);
        assert!(player.last_opponent.is_none());
        assert_eq!(player.extra.get("active"), Some(&serde_json::Value::Bool(true)));

        let written = serde_json::to_value(&player).unwrap();
        assert_eq!(written["active"], serde_json::Value::Bool(true));
        assert!(written.get("last_assigned_at").is_none());
    }

    #[test]
    fn test_missing_missed_games_defaults_to_zero() {
        let player: Player =
            serde_json::from_str(r#"{"name":"carol","elo":990.0,"game_cap":1}"#).unwrap();
        assert_eq!(player.missed_games, 0);
    }

    #[test]
    fn test_active_game_opponent() {
        let game = ActiveGame {
            game_id: 7,
            created_at: Utc::now(),
            p1_id: "1".to_string(),
            p2_id: "2".to_string(),
            template_id: 10,
        };
        assert_eq!(game.opponent_of("1"), Some(&"2".to_string()));
        assert_eq!(game.opponent_of("2"), Some(&"1".to_string()));
        assert_eq!(game.opponent_of("3"), None);
        assert!(game.involves("2"));
    }
}

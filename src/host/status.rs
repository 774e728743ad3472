//! Canonical game status reported by the match host
//!
//! The Warzone API is loose about field names and value types (`winnerID` vs
//! `WinnerID`, IDs as numbers or strings). Everything is normalised here once
//! so the referee only ever sees `GameStatus`.

use crate::error::{LadderError, Result};
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state of a hosted game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    WaitingForSignups,
    Playing,
    Finished,
    Terminated,
    Other(String),
}

impl GameState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "WaitingForSignups" | "WaitingForPlayers" => GameState::WaitingForSignups,
            // Territory picks only start once every seat has joined
            "Playing" | "DistributingTerritories" => GameState::Playing,
            "Finished" => GameState::Finished,
            "Terminated" => GameState::Terminated,
            other => GameState::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameState::WaitingForSignups => write!(f, "WaitingForSignups"),
            GameState::Playing => write!(f, "Playing"),
            GameState::Finished => write!(f, "Finished"),
            GameState::Terminated => write!(f, "Terminated"),
            GameState::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// A seat's state within a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Invited,
    Declined,
    Playing,
    Won,
    Other(String),
}

impl PlayerState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Invited" => PlayerState::Invited,
            "Declined" => PlayerState::Declined,
            "Playing" => PlayerState::Playing,
            "Won" => PlayerState::Won,
            other => PlayerState::Other(other.to_string()),
        }
    }
}

/// One participant as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStatus {
    pub player_id: PlayerId,
    pub state: PlayerState,
}

/// Normalised poll result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatus {
    pub state: GameState,
    pub winner_id: Option<PlayerId>,
    pub players: Vec<SeatStatus>,
}

impl GameStatus {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            winner_id: None,
            players: Vec::new(),
        }
    }

    pub fn with_winner(mut self, winner_id: impl Into<PlayerId>) -> Self {
        self.winner_id = Some(winner_id.into());
        self
    }

    pub fn with_player(mut self, player_id: impl Into<PlayerId>, state: PlayerState) -> Self {
        self.players.push(SeatStatus {
            player_id: player_id.into(),
            state,
        });
        self
    }

    /// Participants whose reported state matches `predicate`
    pub fn players_where(&self, predicate: impl Fn(&PlayerState) -> bool) -> Vec<&PlayerId> {
        self.players
            .iter()
            .filter(|seat| predicate(&seat.state))
            .map(|seat| &seat.player_id)
            .collect()
    }

    /// Normalise a raw GameFeed body
    pub fn from_feed(feed: &Value) -> Result<Self> {
        let raw_state = field(feed, &["state", "State"])
            .and_then(Value::as_str)
            .ok_or_else(|| LadderError::HostRequestFailed {
                message: "Game feed has no state".to_string(),
            })?;

        let players: Vec<SeatStatus> = field(feed, &["players", "Players"])
            .and_then(Value::as_array)
            .map(|seats| {
                seats
                    .iter()
                    .filter_map(|seat| {
                        let player_id = field(seat, &["id", "ID", "playerID"]).and_then(id_string)?;
                        let state = field(seat, &["state", "State"])
                            .and_then(Value::as_str)
                            .map(PlayerState::parse)
                            .unwrap_or_else(|| PlayerState::Other(String::new()));
                        Some(SeatStatus { player_id, state })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let winner_id = field(feed, &["winnerID", "WinnerID", "winnerId", "winner_id"])
            .and_then(id_string)
            .or_else(|| {
                players
                    .iter()
                    .find(|seat| seat.state == PlayerState::Won)
                    .map(|seat| seat.player_id.clone())
            });

        Ok(Self {
            state: GameState::parse(raw_state),
            winner_id,
            players,
        })
    }
}

fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| value.get(*name))
        .filter(|v| !v.is_null())
}

/// Accept IDs sent as strings or numbers
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

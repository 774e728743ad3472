//! Scripted match host for testing and development
//!
//! Statuses, failures and created games are all controlled by the caller,
//! and every call is recorded for later assertions.

use crate::error::{LadderError, Result};
use crate::host::client::MatchHost;
use crate::host::status::GameStatus;
use crate::types::{GameId, GameRequest};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct ScriptState {
    next_game_id: GameId,
    statuses: HashMap<GameId, GameStatus>,
    failing_polls: HashSet<GameId>,
    failing_deletes: HashSet<GameId>,
    failing_players: HashSet<String>,
    created: Vec<(GameId, GameRequest)>,
    deleted: Vec<GameId>,
    polled: Vec<GameId>,
}

/// In-memory `MatchHost` driven by a script
#[derive(Debug)]
pub struct ScriptedMatchHost {
    state: Mutex<ScriptState>,
}

impl ScriptedMatchHost {
    /// Create a host that numbers new games from `first_game_id`
    pub fn new(first_game_id: GameId) -> Self {
        Self {
            state: Mutex::new(ScriptState {
                next_game_id: first_game_id,
                ..ScriptState::default()
            }),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ScriptState) -> T) -> Result<T> {
        let mut state = self.state.lock().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire scripted host lock".to_string(),
        })?;
        Ok(f(&mut state))
    }

    /// Status returned for `game_id` until changed
    pub fn set_status(&self, game_id: GameId, status: GameStatus) {
        let _ = self.with_state(|state| state.statuses.insert(game_id, status));
    }

    /// Make polls of `game_id` fail with a transport error
    pub fn fail_poll(&self, game_id: GameId) {
        let _ = self.with_state(|state| state.failing_polls.insert(game_id));
    }

    /// Make deletion of `game_id` fail
    pub fn fail_delete(&self, game_id: GameId) {
        let _ = self.with_state(|state| state.failing_deletes.insert(game_id));
    }

    /// Reject any game that seats `player_id`
    pub fn fail_create_for(&self, player_id: &str) {
        let _ = self.with_state(|state| state.failing_players.insert(player_id.to_string()));
    }

    pub fn created_games(&self) -> Vec<(GameId, GameRequest)> {
        self.with_state(|state| state.created.clone())
            .unwrap_or_default()
    }

    pub fn deleted_games(&self) -> Vec<GameId> {
        self.with_state(|state| state.deleted.clone())
            .unwrap_or_default()
    }

    pub fn polled_games(&self) -> Vec<GameId> {
        self.with_state(|state| state.polled.clone())
            .unwrap_or_default()
    }
}

impl Default for ScriptedMatchHost {
    fn default() -> Self {
        Self::new(1)
    }
}

#[async_trait]
impl MatchHost for ScriptedMatchHost {
    async fn create_game(&self, request: GameRequest) -> Result<GameId> {
        self.with_state(|state| -> Result<GameId> {
            if let Some(seat) = request
                .seats
                .iter()
                .find(|seat| state.failing_players.contains(&seat.player_id))
            {
                return Err(LadderError::HostRejected {
                    message: format!("CreateGame: player {} cannot be invited", seat.player_id),
                }
                .into());
            }

            let game_id = state.next_game_id;
            state.next_game_id += 1;
            state.created.push((game_id, request));
            Ok(game_id)
        })?
    }

    async fn poll_status(&self, game_id: GameId) -> Result<GameStatus> {
        self.with_state(|state| -> Result<GameStatus> {
            state.polled.push(game_id);
            if state.failing_polls.contains(&game_id) {
                return Err(LadderError::HostRequestFailed {
                    message: format!("GameFeed request failed for {}", game_id),
                }
                .into());
            }

            state.statuses.get(&game_id).cloned().ok_or_else(|| {
                LadderError::HostRejected {
                    message: format!("GameFeed: unknown game {}", game_id),
                }
                .into()
            })
        })?
    }

    async fn delete_game(&self, game_id: GameId) -> Result<()> {
        self.with_state(|state| -> Result<()> {
            if state.failing_deletes.contains(&game_id) {
                return Err(LadderError::HostRequestFailed {
                    message: format!("DeleteLobbyGame request failed for {}", game_id),
                }
                .into());
            }
            state.deleted.push(game_id);
            Ok(())
        })?
    }
}

//! Match host interface
//!
//! The matchmaker and the referee only talk to the external service through
//! this trait. Calls are awaited one at a time by both components.

use crate::error::Result;
use crate::host::status::GameStatus;
use crate::types::{GameId, GameRequest};
use async_trait::async_trait;

/// External service that hosts ladder games
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchHost: Send + Sync {
    /// Open a new game and return its host-assigned ID
    async fn create_game(&self, request: GameRequest) -> Result<GameId>;

    /// Fetch the current status of a game
    async fn poll_status(&self, game_id: GameId) -> Result<GameStatus>;

    /// Remove a game that never left its lobby
    async fn delete_game(&self, game_id: GameId) -> Result<()>;
}

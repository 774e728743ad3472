//! Persisted ladder state
//!
//! Every store is loaded in full at the start of a run and written in full at
//! the end. A missing store is fatal: running without a baseline would let a
//! run pair or referee against empty state and then overwrite the real data.

pub mod json;
pub mod memory;

use crate::error::Result;
use crate::types::{ActiveGame, HistoryRecord, PlayerRegistry, Template};

pub use json::JsonFileStore;
pub use memory::InMemoryStateStore;

/// Load-all / save-all access to the four ladder stores
pub trait StateStore: Send + Sync {
    fn load_players(&self) -> Result<PlayerRegistry>;

    fn save_players(&self, players: &PlayerRegistry) -> Result<()>;

    fn load_active_games(&self) -> Result<Vec<ActiveGame>>;

    fn save_active_games(&self, games: &[ActiveGame]) -> Result<()>;

    fn load_history(&self) -> Result<Vec<HistoryRecord>>;

    fn save_history(&self, history: &[HistoryRecord]) -> Result<()>;

    /// Templates are owned by the registry; this crate never writes them
    fn load_templates(&self) -> Result<Vec<Template>>;
}

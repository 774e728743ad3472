//! In-memory state store for tests and offline runs

use crate::error::{LadderError, Result};
use crate::storage::StateStore;
use crate::types::{ActiveGame, HistoryRecord, PlayerRegistry, Template};
use std::path::PathBuf;
use std::sync::RwLock;

/// Number of times each store was written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveCounts {
    pub players: usize,
    pub active_games: usize,
    pub history: usize,
}

impl SaveCounts {
    pub fn total(&self) -> usize {
        self.players + self.active_games + self.history
    }
}

/// State held behind locks; a `None` store behaves like a missing file
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    players: RwLock<Option<PlayerRegistry>>,
    active_games: RwLock<Option<Vec<ActiveGame>>>,
    history: RwLock<Option<Vec<HistoryRecord>>>,
    templates: RwLock<Option<Vec<Template>>>,
    saves: RwLock<SaveCounts>,
}

fn lock_error(store: &str) -> LadderError {
    LadderError::InternalError {
        message: format!("Failed to acquire {} lock", store),
    }
}

fn missing(store: &str) -> LadderError {
    LadderError::StateFileMissing {
        path: PathBuf::from(format!("memory://{}", store)),
    }
}

impl InMemoryStateStore {
    /// Create a store with every collection present
    pub fn new(
        players: PlayerRegistry,
        active_games: Vec<ActiveGame>,
        history: Vec<HistoryRecord>,
        templates: Vec<Template>,
    ) -> Self {
        Self {
            players: RwLock::new(Some(players)),
            active_games: RwLock::new(Some(active_games)),
            history: RwLock::new(Some(history)),
            templates: RwLock::new(Some(templates)),
            saves: RwLock::new(SaveCounts::default()),
        }
    }

    /// Drop the active games store so loads fail as if the file were missing
    pub fn without_active_games(self) -> Self {
        if let Ok(mut games) = self.active_games.write() {
            *games = None;
        }
        self
    }

    pub fn save_counts(&self) -> SaveCounts {
        self.saves.read().map(|saves| *saves).unwrap_or_default()
    }

    /// Snapshot of the current players
    pub fn players(&self) -> PlayerRegistry {
        self.players
            .read()
            .ok()
            .and_then(|players| players.clone())
            .unwrap_or_default()
    }

    pub fn active_games(&self) -> Vec<ActiveGame> {
        self.active_games
            .read()
            .ok()
            .and_then(|games| games.clone())
            .unwrap_or_default()
    }

    pub fn history(&self) -> Vec<HistoryRecord> {
        self.history
            .read()
            .ok()
            .and_then(|history| history.clone())
            .unwrap_or_default()
    }

    fn record_save(&self, apply: impl FnOnce(&mut SaveCounts)) -> Result<()> {
        let mut saves = self.saves.write().map_err(|_| lock_error("save counter"))?;
        apply(&mut saves);
        Ok(())
    }
}

impl StateStore for InMemoryStateStore {
    fn load_players(&self) -> Result<PlayerRegistry> {
        let players = self.players.read().map_err(|_| lock_error("players"))?;
        players.clone().ok_or_else(|| missing("players").into())
    }

    fn save_players(&self, players: &PlayerRegistry) -> Result<()> {
        *self.players.write().map_err(|_| lock_error("players"))? = Some(players.clone());
        self.record_save(|saves| saves.players += 1)
    }

    fn load_active_games(&self) -> Result<Vec<ActiveGame>> {
        let games = self
            .active_games
            .read()
            .map_err(|_| lock_error("active games"))?;
        games.clone().ok_or_else(|| missing("active_games").into())
    }

    fn save_active_games(&self, games: &[ActiveGame]) -> Result<()> {
        *self
            .active_games
            .write()
            .map_err(|_| lock_error("active games"))? = Some(games.to_vec());
        self.record_save(|saves| saves.active_games += 1)
    }

    fn load_history(&self) -> Result<Vec<HistoryRecord>> {
        let history = self.history.read().map_err(|_| lock_error("history"))?;
        history.clone().ok_or_else(|| missing("history").into())
    }

    fn save_history(&self, history: &[HistoryRecord]) -> Result<()> {
        *self.history.write().map_err(|_| lock_error("history"))? = Some(history.to_vec());
        self.record_save(|saves| saves.history += 1)
    }

    fn load_templates(&self) -> Result<Vec<Template>> {
        let templates = self.templates.read().map_err(|_| lock_error("templates"))?;
        templates.clone().ok_or_else(|| missing("templates").into())
    }
}

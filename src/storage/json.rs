//! JSON file store shared with the registry and the rendering front-end

use crate::config::StorageSettings;
use crate::error::{LadderError, Result};
use crate::storage::StateStore;
use crate::types::{ActiveGame, HistoryRecord, PlayerRegistry, Template};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores each collection as a pretty-printed JSON file in one directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    players_path: PathBuf,
    active_games_path: PathBuf,
    history_path: PathBuf,
    templates_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(settings: &StorageSettings) -> Self {
        Self {
            players_path: settings.players_path(),
            active_games_path: settings.active_games_path(),
            history_path: settings.history_path(),
            templates_path: settings.templates_path(),
        }
    }

    /// Store rooted at `dir` with the default file names
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let settings = StorageSettings {
            data_dir: dir.into(),
            ..StorageSettings::default()
        };
        Self::new(&settings)
    }

    fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
        if !path.exists() {
            return Err(LadderError::StateFileMissing {
                path: path.to_path_buf(),
            }
            .into());
        }

        let raw = fs::read_to_string(path).map_err(|e| LadderError::StateFileCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let value = serde_json::from_str(&raw).map_err(|e| LadderError::StateFileCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Loaded {}", path.display());
        Ok(value)
    }

    /// Write through a sibling temp file so readers never see a partial store
    fn write<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        let body = serde_json::to_string_pretty(value)?;

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        fs::write(&tmp_path, body).map_err(|e| LadderError::InternalError {
            message: format!("Failed to write {}: {}", tmp_path.display(), e),
        })?;
        fs::rename(&tmp_path, path).map_err(|e| LadderError::InternalError {
            message: format!("Failed to replace {}: {}", path.display(), e),
        })?;

        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn load_players(&self) -> Result<PlayerRegistry> {
        Self::read(&self.players_path)
    }

    fn save_players(&self, players: &PlayerRegistry) -> Result<()> {
        Self::write(&self.players_path, players)
    }

    fn load_active_games(&self) -> Result<Vec<ActiveGame>> {
        Self::read(&self.active_games_path)
    }

    fn save_active_games(&self, games: &[ActiveGame]) -> Result<()> {
        Self::write(&self.active_games_path, games)
    }

    fn load_history(&self) -> Result<Vec<HistoryRecord>> {
        Self::read(&self.history_path)
    }

    fn save_history(&self, history: &[HistoryRecord]) -> Result<()> {
        Self::write(&self.history_path, history)
    }

    fn load_templates(&self) -> Result<Vec<Template>> {
        Self::read(&self.templates_path)
    }
}

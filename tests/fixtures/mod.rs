//! Test fixtures shared by the integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use ladder_referee::config::AppConfig;
use ladder_referee::service::LadderApp;
use ladder_referee::storage::{InMemoryStateStore, JsonFileStore};
use ladder_referee::types::{
    ActiveGame, GameId, HistoryRecord, Player, PlayerRegistry, Template,
};
use std::path::Path;
use std::sync::Arc;

/// Fixed reference time for deterministic tests
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-09-14T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn player(name: &str, elo: f64, game_cap: u32, missed_games: u32) -> Player {
    let mut player = Player::new(name, elo, game_cap);
    player.missed_games = missed_games;
    player
}

/// Registry builder: `(id, name, elo, cap, missed)`
pub fn registry(entries: &[(&str, &str, f64, u32, u32)]) -> PlayerRegistry {
    entries
        .iter()
        .map(|(id, name, elo, cap, missed)| (id.to_string(), player(name, *elo, *cap, *missed)))
        .collect()
}

pub fn active_game(game_id: GameId, p1: &str, p2: &str, created_at: DateTime<Utc>) -> ActiveGame {
    ActiveGame {
        game_id,
        created_at,
        p1_id: p1.to_string(),
        p2_id: p2.to_string(),
        template_id: 1001,
    }
}

/// Active game created `hours` before the current wall clock
pub fn game_aged(game_id: GameId, p1: &str, p2: &str, hours: i64) -> ActiveGame {
    active_game(game_id, p1, p2, Utc::now() - Duration::hours(hours))
}

pub fn templates() -> Vec<Template> {
    vec![
        Template {
            id: 1001,
            name: "Small Earth".to_string(),
        },
        Template {
            id: 1002,
            name: "Europe".to_string(),
        },
    ]
}

/// In-memory store plus an app over it
pub fn memory_app(
    players: PlayerRegistry,
    active_games: Vec<ActiveGame>,
    history: Vec<HistoryRecord>,
    templates: Vec<Template>,
) -> (LadderApp, Arc<InMemoryStateStore>) {
    let store = Arc::new(InMemoryStateStore::new(
        players,
        active_games,
        history,
        templates,
    ));
    let app = LadderApp::new(AppConfig::default(), store.clone()).unwrap();
    (app, store)
}

/// Write a complete set of state files into `dir`
pub fn write_state(
    dir: &Path,
    players: &PlayerRegistry,
    active_games: &[ActiveGame],
    history: &[HistoryRecord],
    templates: &[Template],
) {
    let write = |name: &str, body: String| std::fs::write(dir.join(name), body).unwrap();
    write("players.json", serde_json::to_string_pretty(players).unwrap());
    write(
        "active_games.json",
        serde_json::to_string_pretty(active_games).unwrap(),
    );
    write("history.json", serde_json::to_string_pretty(history).unwrap());
    write("templates.json", serde_json::to_string_pretty(templates).unwrap());
}

/// App over JSON files in `dir`
pub fn file_app(dir: &Path) -> LadderApp {
    let store = Arc::new(JsonFileStore::in_dir(dir));
    LadderApp::new(AppConfig::default(), store).unwrap()
}

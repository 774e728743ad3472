//! Applying verdicts to ladder state
//!
//! `reconcile` takes everything a referee run observed and returns the new
//! state plus a `changed` flag. It performs no I/O; the caller deletes
//! timed-out lobbies beforehand and decides whether to persist.

use crate::config::LadderConfig;
use crate::host::GameStatus;
use crate::rating::EloCalculator;
use crate::referee::verdict::{adjudicate, Verdict};
use crate::types::{
    ActiveGame, GameId, HistoryRecord, PlayerId, PlayerRegistry, NOTE_DRAW, NOTE_LOBBY_TIMEOUT,
    NOTE_TERMINATED,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// One active game and what polling it returned (`None` when the poll failed)
#[derive(Debug, Clone)]
pub struct Observation {
    pub game: ActiveGame,
    pub status: Option<GameStatus>,
    /// The host still holds this timed-out lobby; retried next run
    pub deletion_failed: bool,
}

impl Observation {
    pub fn polled(game: ActiveGame, status: GameStatus) -> Self {
        Self {
            game,
            status: Some(status),
            deletion_failed: false,
        }
    }

    pub fn poll_failed(game: ActiveGame) -> Self {
        Self {
            game,
            status: None,
            deletion_failed: false,
        }
    }
}

/// Per-run tallies, used for logging and metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefereeSummary {
    pub decisive: usize,
    pub draws: usize,
    pub lobby_timeouts: usize,
    pub terminated: usize,
    pub still_active: usize,
    pub poll_failures: usize,
    pub deletion_failures: usize,
    pub strikes: usize,
    pub strikes_cleared: usize,
    pub missing_players: usize,
}

impl RefereeSummary {
    pub fn resolved(&self) -> usize {
        self.decisive + self.draws + self.lobby_timeouts + self.terminated
    }
}

/// New ladder state after a referee run
#[derive(Debug, Clone)]
pub struct RefereeRun {
    pub players: PlayerRegistry,
    pub active_games: Vec<ActiveGame>,
    pub history: Vec<HistoryRecord>,
    /// Any store needs rewriting
    pub changed: bool,
    /// Timed-out lobbies archived this run
    pub timed_out: Vec<GameId>,
    pub summary: RefereeSummary,
}

struct Reconciler<'a> {
    players: PlayerRegistry,
    summary: RefereeSummary,
    elo: &'a EloCalculator,
    changed: bool,
    missing: BTreeSet<(GameId, PlayerId)>,
}

impl<'a> Reconciler<'a> {
    fn strike(&mut self, game_id: GameId, player_id: &str) {
        match self.players.get_mut(player_id) {
            Some(player) => {
                player.missed_games += 1;
                self.summary.strikes += 1;
                self.changed = true;
                info!(
                    "Strike for {} in game {} ({} missed)",
                    player_id, game_id, player.missed_games
                );
            }
            None => self.missing(game_id, player_id),
        }
    }

    fn clear_strikes(&mut self, game_id: GameId, player_id: &str) {
        match self.players.get_mut(player_id) {
            Some(player) if player.missed_games > 0 => {
                debug!(
                    "Clearing {} strikes for {} after game {}",
                    player.missed_games, player_id, game_id
                );
                player.missed_games = 0;
                self.summary.strikes_cleared += 1;
                self.changed = true;
            }
            Some(_) => {}
            None => self.missing(game_id, player_id),
        }
    }

    fn record_opponents(&mut self, game: &ActiveGame) {
        for (player_id, opponent) in [(&game.p1_id, &game.p2_id), (&game.p2_id, &game.p1_id)] {
            if let Some(player) = self.players.get_mut(player_id) {
                if !player.last_faced(opponent) {
                    player.last_opponent = Some(opponent.clone());
                    self.changed = true;
                }
            }
        }
    }

    /// Counted once per player and game however many updates get skipped
    fn missing(&mut self, game_id: GameId, player_id: &str) {
        if self.missing.insert((game_id, player_id.to_string())) {
            warn!(
                "Player {} from game {} is not registered, skipping update",
                player_id, game_id
            );
            self.summary.missing_players += 1;
        }
    }

    fn rate(&mut self, game_id: GameId, winner: &PlayerId, loser: &PlayerId) {
        let ratings = match (self.players.get(winner), self.players.get(loser)) {
            (Some(w), Some(l)) => Some((w.elo, l.elo)),
            _ => None,
        };
        let Some((winner_elo, loser_elo)) = ratings else {
            info!("Game {}: rating skipped", game_id);
            for player_id in [winner, loser] {
                if !self.players.contains_key(player_id) {
                    self.missing(game_id, player_id);
                }
            }
            return;
        };

        let update = self.elo.rate_decisive(winner_elo, loser_elo);
        info!(
            "Game {}: {} {:.0} -> {:.0}, {} {:.0} -> {:.0}",
            game_id, winner, winner_elo, update.winner, loser, loser_elo, update.loser
        );
        if let Some(player) = self.players.get_mut(winner) {
            player.elo = update.winner;
        }
        if let Some(player) = self.players.get_mut(loser) {
            player.elo = update.loser;
        }
    }
}

/// Reconcile every observed game against the current players and history
pub fn reconcile(
    players: PlayerRegistry,
    mut history: Vec<HistoryRecord>,
    observations: Vec<Observation>,
    now: DateTime<Utc>,
    config: &LadderConfig,
    elo: &EloCalculator,
) -> RefereeRun {
    let mut reconciler = Reconciler {
        players,
        summary: RefereeSummary::default(),
        elo,
        changed: false,
        missing: BTreeSet::new(),
    };
    let mut active_games = Vec::new();
    let mut timed_out = Vec::new();

    for Observation {
        game,
        status,
        deletion_failed,
    } in observations
    {
        let Some(status) = status else {
            reconciler.summary.poll_failures += 1;
            active_games.push(game);
            continue;
        };

        let verdict = adjudicate(&game, &status, now, config);
        debug!("Game {} ({}): {:?}", game.game_id, status.state, verdict);

        let mut record = HistoryRecord {
            game_id: game.game_id,
            winner_id: None,
            loser_id: None,
            p1_id: Some(game.p1_id.clone()),
            p2_id: Some(game.p2_id.clone()),
            note: None,
            finished_at: now,
            template_id: Some(game.template_id),
        };

        match verdict {
            Verdict::Pending => {
                reconciler.summary.still_active += 1;
                active_games.push(game);
                continue;
            }
            Verdict::Joined => {
                for player_id in game.participants() {
                    reconciler.clear_strikes(game.game_id, player_id);
                }
                reconciler.summary.still_active += 1;
                active_games.push(game);
                continue;
            }
            Verdict::LobbyTimeout { .. } if deletion_failed => {
                warn!(
                    "Game {} lobby timed out but is still open on the host, keeping it",
                    game.game_id
                );
                reconciler.summary.deletion_failures += 1;
                active_games.push(game);
                continue;
            }
            Verdict::LobbyTimeout { strikes } => {
                info!("Game {} lobby timed out", game.game_id);
                for player_id in &strikes {
                    reconciler.strike(game.game_id, player_id);
                }
                timed_out.push(game.game_id);
                record.note = Some(NOTE_LOBBY_TIMEOUT.to_string());
                reconciler.summary.lobby_timeouts += 1;
            }
            Verdict::Terminated { strikes } => {
                info!("Game {} was terminated", game.game_id);
                for player_id in &strikes {
                    reconciler.strike(game.game_id, player_id);
                }
                record.note = Some(NOTE_TERMINATED.to_string());
                reconciler.summary.terminated += 1;
            }
            Verdict::Decisive { winner, loser } => {
                reconciler.rate(game.game_id, &winner, &loser);
                for player_id in game.participants() {
                    reconciler.clear_strikes(game.game_id, player_id);
                }
                reconciler.record_opponents(&game);
                record.winner_id = Some(winner);
                record.loser_id = Some(loser);
                reconciler.summary.decisive += 1;
            }
            Verdict::Draw => {
                info!("Game {} finished without a winner", game.game_id);
                for player_id in game.participants() {
                    reconciler.clear_strikes(game.game_id, player_id);
                }
                reconciler.record_opponents(&game);
                record.note = Some(NOTE_DRAW.to_string());
                reconciler.summary.draws += 1;
            }
        }

        history.push(record);
        reconciler.changed = true;
    }

    RefereeRun {
        players: reconciler.players,
        active_games,
        history,
        changed: reconciler.changed,
        timed_out,
        summary: reconciler.summary,
    }
}

//! Referee run
//!
//! Polls every active game one at a time, deletes timed-out lobbies on the
//! host, then reconciles. A lobby the host fails to delete stays active and is
//! retried next run.

use crate::config::LadderConfig;
use crate::error::Result;
use crate::host::MatchHost;
use crate::rating::EloCalculator;
use crate::referee::reconcile::{reconcile, Observation, RefereeRun};
use crate::referee::verdict::{adjudicate, Verdict};
use crate::types::{ActiveGame, GameId, HistoryRecord, PlayerRegistry};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// Outcome of a full referee pass
#[derive(Debug, Clone)]
pub struct RefereeOutcome {
    pub run: RefereeRun,
    /// Lobbies the host refused or failed to delete
    pub failed_deletions: Vec<GameId>,
}

/// Resolves active games against the match host
#[derive(Debug, Clone)]
pub struct Referee {
    config: LadderConfig,
    elo: EloCalculator,
}

impl Referee {
    pub fn new(config: LadderConfig) -> Result<Self> {
        let elo = EloCalculator::new(config.k_factor)?;
        Ok(Self { config, elo })
    }

    pub fn config(&self) -> &LadderConfig {
        &self.config
    }

    /// Poll every game in order and collect observations
    pub async fn observe(&self, host: &dyn MatchHost, active_games: Vec<ActiveGame>) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(active_games.len());

        for game in active_games {
            let observation = match host.poll_status(game.game_id).await {
                Ok(status) => Observation::polled(game, status),
                Err(e) => {
                    warn!("Failed to poll game {}, retrying next run: {}", game.game_id, e);
                    Observation::poll_failed(game)
                }
            };
            observations.push(observation);
        }

        observations
    }

    /// Delete every timed-out lobby on the host, flagging the ones that failed
    pub async fn delete_timed_out(
        &self,
        host: &dyn MatchHost,
        observations: &mut [Observation],
        now: DateTime<Utc>,
    ) -> Vec<GameId> {
        let mut failed = Vec::new();

        for observation in observations.iter_mut() {
            let Some(status) = &observation.status else {
                continue;
            };
            let game_id = observation.game.game_id;
            if !matches!(
                adjudicate(&observation.game, status, now, &self.config),
                Verdict::LobbyTimeout { .. }
            ) {
                continue;
            }

            match host.delete_game(game_id).await {
                Ok(()) => info!("Deleted timed-out lobby {}", game_id),
                Err(e) => {
                    error!("Failed to delete lobby {}, retrying next run: {}", game_id, e);
                    observation.deletion_failed = true;
                    failed.push(game_id);
                }
            }
        }

        failed
    }

    /// Full pass: poll, delete timed-out lobbies, then reconcile
    pub async fn run(
        &self,
        host: &dyn MatchHost,
        players: PlayerRegistry,
        active_games: Vec<ActiveGame>,
        history: Vec<HistoryRecord>,
        now: DateTime<Utc>,
    ) -> RefereeOutcome {
        info!("Refereeing {} active games", active_games.len());

        let mut observations = self.observe(host, active_games).await;
        let failed_deletions = self.delete_timed_out(host, &mut observations, now).await;
        let run = reconcile(players, history, observations, now, &self.config, &self.elo);

        info!(
            "Referee pass complete: {} resolved, {} still active, {} poll failures, {} strikes",
            run.summary.resolved(),
            run.summary.still_active,
            run.summary.poll_failures,
            run.summary.strikes
        );

        RefereeOutcome {
            run,
            failed_deletions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LadderError;
    use crate::host::{GameState, GameStatus, MockMatchHost, PlayerState};
    use crate::types::Player;
    use chrono::Duration;
    use mockall::predicate::eq;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn players() -> PlayerRegistry {
        let mut players = PlayerRegistry::new();
        players.insert("1".to_string(), Player::new("alice", 1000.0, 2));
        players.insert("2".to_string(), Player::new("bob", 1000.0, 2));
        players
    }

    fn game(id: GameId, hours_ago: i64) -> ActiveGame {
        ActiveGame {
            game_id: id,
            created_at: now() - Duration::hours(hours_ago),
            p1_id: "1".to_string(),
            p2_id: "2".to_string(),
            template_id: 4,
        }
    }

    #[test]
    fn test_rejects_bad_k_factor() {
        let config = LadderConfig {
            k_factor: -1.0,
            ..LadderConfig::default()
        };
        assert!(Referee::new(config).is_err());
    }

    #[tokio::test]
    async fn test_poll_failure_keeps_game() {
        let mut host = MockMatchHost::new();
        host.expect_poll_status().with(eq(10)).times(1).returning(|_| {
            Err(LadderError::HostRequestFailed {
                message: "timeout".to_string(),
            }
            .into())
        });
        host.expect_delete_game().never();

        let referee = Referee::new(LadderConfig::default()).unwrap();
        let outcome = referee
            .run(&host, players(), vec![game(10, 200)], vec![], now())
            .await;

        assert!(!outcome.run.changed);
        assert_eq!(outcome.run.active_games.len(), 1);
        assert_eq!(outcome.run.summary.poll_failures, 1);
    }

    #[tokio::test]
    async fn test_timed_out_lobby_is_deleted() {
        let mut host = MockMatchHost::new();
        host.expect_poll_status().with(eq(11)).times(1).returning(|_| {
            Ok(GameStatus::new(GameState::WaitingForSignups)
                .with_player("1", PlayerState::Declined)
                .with_player("2", PlayerState::Playing))
        });
        host.expect_delete_game()
            .with(eq(11))
            .times(1)
            .returning(|_| Ok(()));

        let referee = Referee::new(LadderConfig::default()).unwrap();
        let outcome = referee
            .run(&host, players(), vec![game(11, 80)], vec![], now())
            .await;

        assert!(outcome.failed_deletions.is_empty());
        assert_eq!(outcome.run.timed_out, vec![11]);
        assert_eq!(outcome.run.players["1"].missed_games, 1);
        assert!(outcome.run.active_games.is_empty());
    }

    #[tokio::test]
    async fn test_failed_deletion_keeps_lobby_for_next_run() {
        let mut host = MockMatchHost::new();
        host.expect_poll_status()
            .returning(|_| Ok(GameStatus::new(GameState::WaitingForSignups)
                .with_player("2", PlayerState::Invited)));
        host.expect_delete_game().times(1).returning(|_| {
            Err(LadderError::HostRejected {
                message: "game already started".to_string(),
            }
            .into())
        });

        let referee = Referee::new(LadderConfig::default()).unwrap();
        let outcome = referee
            .run(&host, players(), vec![game(12, 73)], vec![], now())
            .await;

        assert_eq!(outcome.failed_deletions, vec![12]);
        assert!(!outcome.run.changed);
        assert_eq!(outcome.run.active_games, vec![game(12, 73)]);
        assert!(outcome.run.history.is_empty());
        assert_eq!(outcome.run.players["2"].missed_games, 0);
        assert_eq!(outcome.run.summary.deletion_failures, 1);
    }

    #[tokio::test]
    async fn test_pending_lobby_is_not_deleted() {
        let mut host = MockMatchHost::new();
        host.expect_poll_status()
            .returning(|_| Ok(GameStatus::new(GameState::WaitingForSignups)));
        host.expect_delete_game().never();

        let referee = Referee::new(LadderConfig::default()).unwrap();
        let outcome = referee
            .run(&host, players(), vec![game(13, 72)], vec![], now())
            .await;

        assert!(outcome.failed_deletions.is_empty());
        assert_eq!(outcome.run.active_games.len(), 1);
    }
}

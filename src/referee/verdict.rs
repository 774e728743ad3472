//! Classifying a polled game
//!
//! `adjudicate` is pure: it looks at one active game and its normalised
//! status and decides what the referee should do, without touching any
//! player record.

use crate::config::LadderConfig;
use crate::host::{GameState, GameStatus, PlayerState};
use crate::types::{ActiveGame, PlayerId};
use crate::utils::elapsed_since;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// What should happen to one active game this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Lobby still open or state not understood; keep as is
    Pending,
    /// Both players joined; clear their strikes and keep the game
    Joined,
    /// Lobby sat unfilled past the timeout
    LobbyTimeout { strikes: Vec<PlayerId> },
    /// Game ended by the host before it was decided
    Terminated { strikes: Vec<PlayerId> },
    Decisive { winner: PlayerId, loser: PlayerId },
    Draw,
}

impl Verdict {
    /// Terminal verdicts archive the game and drop it from the active list
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Verdict::Pending | Verdict::Joined)
    }
}

/// Participants of `game` reported in one of `states`, each at most once
fn seats_in(game: &ActiveGame, status: &GameStatus, states: &[PlayerState]) -> Vec<PlayerId> {
    let mut found: Vec<PlayerId> = Vec::new();
    for player_id in status.players_where(|state| states.contains(state)) {
        if !game.involves(player_id) {
            warn!(
                "Game {} reports seat {} that is not a participant",
                game.game_id, player_id
            );
            continue;
        }
        if !found.contains(player_id) {
            found.push(player_id.clone());
        }
    }
    found
}

/// Decide what to do with `game` given its current `status`
pub fn adjudicate(
    game: &ActiveGame,
    status: &GameStatus,
    now: DateTime<Utc>,
    config: &LadderConfig,
) -> Verdict {
    match &status.state {
        GameState::WaitingForSignups => {
            if elapsed_since(game.created_at, now) > config.lobby_timeout() {
                Verdict::LobbyTimeout {
                    strikes: seats_in(
                        game,
                        status,
                        &[PlayerState::Invited, PlayerState::Declined],
                    ),
                }
            } else {
                Verdict::Pending
            }
        }
        GameState::Playing => Verdict::Joined,
        GameState::Terminated => Verdict::Terminated {
            strikes: seats_in(game, status, &[PlayerState::Declined]),
        },
        GameState::Finished => match &status.winner_id {
            Some(winner) => match game.opponent_of(winner) {
                Some(loser) => Verdict::Decisive {
                    winner: winner.clone(),
                    loser: loser.clone(),
                },
                None => {
                    warn!(
                        "Game {} finished with winner {} who is not a participant, scoring as a draw",
                        game.game_id, winner
                    );
                    Verdict::Draw
                }
            },
            None => Verdict::Draw,
        },
        GameState::Other(raw) => {
            debug!("Game {} is in unhandled state {}", game.game_id, raw);
            Verdict::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-20T18:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn game_aged(hours: i64) -> ActiveGame {
        ActiveGame {
            game_id: 42,
            created_at: now() - Duration::hours(hours),
            p1_id: "1".to_string(),
            p2_id: "2".to_string(),
            template_id: 3,
        }
    }

    #[test]
    fn test_fresh_lobby_is_pending() {
        let status = GameStatus::new(GameState::WaitingForSignups)
            .with_player("1", PlayerState::Playing)
            .with_player("2", PlayerState::Invited);
        let verdict = adjudicate(&game_aged(71), &status, now(), &LadderConfig::default());
        assert_eq!(verdict, Verdict::Pending);
        assert!(!verdict.is_terminal());
    }

    #[test]
    fn test_lobby_at_exactly_timeout_is_pending() {
        let status = GameStatus::new(GameState::WaitingForSignups);
        let verdict = adjudicate(&game_aged(72), &status, now(), &LadderConfig::default());
        assert_eq!(verdict, Verdict::Pending);
    }

    #[test]
    fn test_stale_lobby_strikes_invited_and_declined() {
        let status = GameStatus::new(GameState::WaitingForSignups)
            .with_player("1", PlayerState::Declined)
            .with_player("2", PlayerState::Invited);
        let verdict = adjudicate(&game_aged(80), &status, now(), &LadderConfig::default());
        assert_eq!(
            verdict,
            Verdict::LobbyTimeout {
                strikes: vec!["1".to_string(), "2".to_string()]
            }
        );
        assert!(verdict.is_terminal());
    }

    #[test]
    fn test_stale_lobby_spares_joined_player() {
        let status = GameStatus::new(GameState::WaitingForSignups)
            .with_player("1", PlayerState::Playing)
            .with_player("2", PlayerState::Invited)
            .with_player("9", PlayerState::Invited);
        let verdict = adjudicate(&game_aged(100), &status, now(), &LadderConfig::default());
        assert_eq!(
            verdict,
            Verdict::LobbyTimeout {
                strikes: vec!["2".to_string()]
            }
        );
    }

    #[test]
    fn test_terminated_strikes_only_decliners() {
        let status = GameStatus::new(GameState::Terminated)
            .with_player("1", PlayerState::Declined)
            .with_player("2", PlayerState::Invited);
        let verdict = adjudicate(&game_aged(1), &status, now(), &LadderConfig::default());
        assert_eq!(
            verdict,
            Verdict::Terminated {
                strikes: vec!["1".to_string()]
            }
        );
    }

    #[test]
    fn test_finished_with_winner() {
        let status = GameStatus::new(GameState::Finished).with_winner("2");
        let verdict = adjudicate(&game_aged(5), &status, now(), &LadderConfig::default());
        assert_eq!(
            verdict,
            Verdict::Decisive {
                winner: "2".to_string(),
                loser: "1".to_string()
            }
        );
    }

    #[test]
    fn test_finished_without_winner_is_draw() {
        let status = GameStatus::new(GameState::Finished);
        let config = LadderConfig::default();
        assert_eq!(adjudicate(&game_aged(5), &status, now(), &config), Verdict::Draw);

        let stranger = GameStatus::new(GameState::Finished).with_winner("77");
        assert_eq!(adjudicate(&game_aged(5), &stranger, now(), &config), Verdict::Draw);
    }

    #[test]
    fn test_playing_and_unknown_states() {
        let config = LadderConfig::default();
        let playing = GameStatus::new(GameState::Playing);
        assert_eq!(adjudicate(&game_aged(500), &playing, now(), &config), Verdict::Joined);

        let odd = GameStatus::new(GameState::Other("Paused".to_string()));
        assert_eq!(adjudicate(&game_aged(500), &odd, now(), &config), Verdict::Pending);
    }
}

//! Warzone API client
//!
//! Thin HTTP adapter over the three endpoints the ladder needs. Responses are
//! checked for the API's `error` field and normalised before returning.

use crate::config::HostSettings;
use crate::error::{LadderError, Result};
use crate::host::client::MatchHost;
use crate::host::status::{id_string, GameStatus};
use crate::types::{GameId, GameRequest};
use crate::utils::truncate_chars;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

/// Longest game name the service accepts
pub const MAX_GAME_NAME_CHARS: usize = 50;

/// HTTP client for www.warzone.com/API
#[derive(Debug, Clone)]
pub struct WarzoneClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    api_token: String,
}

impl WarzoneClient {
    /// Build a client; fails if credentials are missing
    pub fn new(settings: &HostSettings) -> Result<Self> {
        if !settings.has_credentials() {
            return Err(LadderError::ConfigurationError {
                message: "Missing WZ_EMAIL or WZ_API_TOKEN".to_string(),
            }
            .into());
        }

        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| LadderError::ConfigurationError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            email: settings.email.clone(),
            api_token: settings.api_token.clone(),
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn read_body(response: reqwest::Response, endpoint: &str) -> Result<Value> {
        let status = response.status();
        let body: Value = response.json().await.map_err(|e| LadderError::HostRequestFailed {
            message: format!("{} returned unreadable body (HTTP {}): {}", endpoint, status, e),
        })?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(LadderError::HostRejected {
                message: format!("{}: {}", endpoint, message),
            }
            .into());
        }

        Ok(body)
    }

    fn transport_error(endpoint: &str, error: reqwest::Error) -> LadderError {
        LadderError::HostRequestFailed {
            message: format!("{} request failed: {}", endpoint, error),
        }
    }

    /// JSON payload for CreateGame
    pub fn create_game_payload(&self, request: &GameRequest) -> Value {
        let players: Vec<Value> = request
            .seats
            .iter()
            .map(|seat| json!({ "token": seat.player_id, "team": seat.team.to_string() }))
            .collect();

        json!({
            "hostEmail": self.email,
            "hostAPIToken": self.api_token,
            "templateID": request.template_id,
            "gameName": truncate_chars(&request.title, MAX_GAME_NAME_CHARS),
            "personalMessage": request.description,
            "players": players,
        })
    }
}

#[async_trait]
impl MatchHost for WarzoneClient {
    async fn create_game(&self, request: GameRequest) -> Result<GameId> {
        let url = self.endpoint("CreateGame");
        let response = self
            .http
            .post(&url)
            .json(&self.create_game_payload(&request))
            .send()
            .await
            .map_err(|e| Self::transport_error("CreateGame", e))?;

        let body = Self::read_body(response, "CreateGame").await?;
        let game_id = body
            .get("gameID")
            .and_then(id_string)
            .and_then(|id| id.parse::<GameId>().ok())
            .ok_or_else(|| LadderError::HostRequestFailed {
                message: format!("CreateGame response has no gameID: {}", body),
            })?;

        debug!("Created game {} from template {}", game_id, request.template_id);
        Ok(game_id)
    }

    async fn poll_status(&self, game_id: GameId) -> Result<GameStatus> {
        let url = format!("{}?GameID={}", self.endpoint("GameFeed"), game_id);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("Email", self.email.as_str()),
                ("APIToken", self.api_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Self::transport_error("GameFeed", e))?;

        let body = Self::read_body(response, "GameFeed").await?;
        GameStatus::from_feed(&body)
    }

    async fn delete_game(&self, game_id: GameId) -> Result<()> {
        let url = self.endpoint("DeleteLobbyGame");
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "Email": self.email,
                "APIToken": self.api_token,
                "gameID": game_id,
            }))
            .send()
            .await
            .map_err(|e| Self::transport_error("DeleteLobbyGame", e))?;

        Self::read_body(response, "DeleteLobbyGame").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Seat;

    fn settings() -> HostSettings {
        HostSettings {
            email: "host@example.com".to_string(),
            api_token: "secret".to_string(),
            base_url: "https://www.warzone.com/API/".to_string(),
            ..HostSettings::default()
        }
    }

    #[test]
    fn test_requires_credentials() {
        assert!(WarzoneClient::new(&HostSettings::default()).is_err());
        assert!(WarzoneClient::new(&settings()).is_ok());
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = WarzoneClient::new(&settings()).unwrap();
        assert_eq!(
            client.endpoint("CreateGame"),
            "https://www.warzone.com/API/CreateGame"
        );
    }

    #[test]
    fn test_create_game_payload_shape() {
        let client = WarzoneClient::new(&settings()).unwrap();
        let request = GameRequest {
            template_id: 1234,
            seats: vec![
                Seat {
                    player_id: "111".to_string(),
                    team: 0,
                },
                Seat {
                    player_id: "222".to_string(),
                    team: 1,
                },
            ],
            title: "Ladder: a_really_long_player_name vs another_really_long_name".to_string(),
            description: "Ranked ladder game".to_string(),
        };

        let payload = client.create_game_payload(&request);
        assert_eq!(payload["templateID"], 1234);
        assert_eq!(payload["hostAPIToken"], "secret");
        assert_eq!(payload["players"][1]["token"], "222");
        assert_eq!(payload["players"][1]["team"], "1");
        assert_eq!(
            payload["gameName"].as_str().unwrap().chars().count(),
            MAX_GAME_NAME_CHARS
        );
    }
}

//! Elo rating updates for decided 1v1 games
//!
//! Wraps the Elo implementation from the skillratings crate and rounds the
//! result to whole points, which is how ratings are stored and displayed.

use crate::error::{LadderError, Result};
use serde::{Deserialize, Serialize};
use skillratings::elo::{elo, expected_score, EloConfig, EloRating};
use skillratings::Outcomes;

/// New ratings after a decided game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloUpdate {
    pub winner: f64,
    pub loser: f64,
}

/// Elo calculator with a fixed K-factor
#[derive(Debug, Clone)]
pub struct EloCalculator {
    config: EloConfig,
}

impl EloCalculator {
    pub fn new(k_factor: f64) -> Result<Self> {
        if k_factor.is_nan() || k_factor <= 0.0 {
            return Err(LadderError::ConfigurationError {
                message: format!("Elo K-factor must be positive, got {}", k_factor),
            }
            .into());
        }

        Ok(Self {
            config: EloConfig { k: k_factor },
        })
    }

    pub fn k_factor(&self) -> f64 {
        self.config.k
    }

    /// Probability that `self_elo` beats `other_elo`
    pub fn expected_score(&self, self_elo: f64, other_elo: f64) -> f64 {
        let (expected, _) = expected_score(
            &EloRating { rating: self_elo },
            &EloRating { rating: other_elo },
        );
        expected
    }

    /// Rate a game with a winner and a loser
    pub fn rate_decisive(&self, winner_elo: f64, loser_elo: f64) -> EloUpdate {
        let (winner, loser) = elo(
            &EloRating { rating: winner_elo },
            &EloRating { rating: loser_elo },
            &Outcomes::WIN,
            &self.config,
        );

        EloUpdate {
            winner: winner.rating.round(),
            loser: loser.rating.round(),
        }
    }
}

//! Application entry points for the ladder jobs
//!
//! `LadderApp` owns the configuration, the state store handle and the run
//! metrics. Each public method is one batch run: load every store it needs,
//! compute, then write once at the end.

use crate::config::AppConfig;
use crate::error::{LadderError, Result};
use crate::host::MatchHost;
use crate::matchmaker::{MatchPlan, Matchmaker, PairingTier, PlannedMatch};
use crate::metrics::MetricsCollector;
use crate::rating::{compute_ranks, standings, Standing};
use crate::referee::{Referee, RefereeSummary};
use crate::storage::{JsonFileStore, StateStore};
use crate::types::{ActiveGame, GameId, PlayerId, Template, TemplateId};
use crate::utils::{current_timestamp, generate_run_id};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// What a matchmaker run did
#[derive(Debug, Clone, Serialize)]
pub struct MatchmakerReport {
    pub run_id: Uuid,
    /// Matches planned (and, outside dry runs, submitted)
    pub planned: usize,
    pub created: Vec<ActiveGame>,
    pub failed: usize,
    pub dry_run: bool,
    /// Nothing was attempted because the template pool is empty
    pub no_templates: bool,
    pub state_written: bool,
}

/// What a referee run did
#[derive(Debug, Clone, Serialize)]
pub struct RefereeReport {
    pub run_id: Uuid,
    pub summary: RefereeSummary,
    pub failed_deletions: Vec<GameId>,
    pub state_written: bool,
}

/// Ladder application state
pub struct LadderApp {
    /// Application configuration
    config: AppConfig,

    store: Arc<dyn StateStore>,

    metrics: MetricsCollector,
}

impl LadderApp {
    pub fn new(config: AppConfig, store: Arc<dyn StateStore>) -> Result<Self> {
        let metrics = MetricsCollector::new().map_err(|e| LadderError::InternalError {
            message: format!("Failed to create metrics collector: {}", e),
        })?;

        Ok(Self {
            config,
            store,
            metrics,
        })
    }

    /// Application backed by the JSON files named in the configuration
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let store = Arc::new(JsonFileStore::new(&config.storage));
        Self::new(config, store)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    fn matchmaker(&self) -> Matchmaker {
        Matchmaker::new(
            self.config.ladder.clone(),
            self.config.host.game_name_prefix.clone(),
        )
    }

    /// One matchmaker run with an entropy-seeded generator
    pub async fn run_matchmaker(&self, host: &dyn MatchHost, dry_run: bool) -> Result<MatchmakerReport> {
        let mut rng = StdRng::from_entropy();
        self.run_matchmaker_with(host, dry_run, &mut rng).await
    }

    /// One matchmaker run; `rng` drives the shuffles and template picks
    pub async fn run_matchmaker_with<R: Rng + Send>(
        &self,
        host: &dyn MatchHost,
        dry_run: bool,
        rng: &mut R,
    ) -> Result<MatchmakerReport> {
        let run_id = generate_run_id();
        let span = info_span!("matchmaker", %run_id);
        self.matchmaker_pass(run_id, host, dry_run, rng)
            .instrument(span)
            .await
    }

    async fn matchmaker_pass<R: Rng + Send>(
        &self,
        run_id: Uuid,
        host: &dyn MatchHost,
        dry_run: bool,
        rng: &mut R,
    ) -> Result<MatchmakerReport> {
        let timer = self.metrics.start_timer();
        let now = current_timestamp();

        let players = self.store.load_players()?;
        let active_games = self.store.load_active_games()?;
        let templates = self.store.load_templates()?;
        info!(
            "Loaded {} players, {} active games, {} templates",
            players.len(),
            active_games.len(),
            templates.len()
        );

        let matchmaker = self.matchmaker();
        let mut report = MatchmakerReport {
            run_id,
            planned: 0,
            created: Vec::new(),
            failed: 0,
            dry_run,
            no_templates: false,
            state_written: false,
        };

        let matches = match matchmaker.plan(&players, &active_games, &templates, now, rng) {
            MatchPlan::NoTemplates => {
                report.no_templates = true;
                self.finish(timer.stop(), false);
                return Ok(report);
            }
            MatchPlan::Ready {
                matches,
                open_slots,
                leftover_slots,
            } => {
                self.metrics.record_plan(open_slots, leftover_slots, &matches);
                matches
            }
        };
        report.planned = matches.len();

        if dry_run {
            for planned in &matches {
                info!(
                    "[dry run] {} vs {} ({}) on template {}",
                    planned.p1, planned.p2, planned.tier, planned.template.id
                );
            }
            self.finish(timer.stop(), false);
            return Ok(report);
        }

        let run = matchmaker
            .submit(host, players, active_games, matches, now)
            .await;
        self.metrics.record_matchmaker_run(&run);

        self.store.save_active_games(&run.active_games)?;
        if run.players_changed {
            self.store.save_players(&run.players)?;
        }

        info!(
            "Matchmaker run complete: {} games created, {} failed",
            run.created.len(),
            run.failed.len()
        );
        report.failed = run.failed.len();
        report.created = run.created;
        report.state_written = true;
        self.finish(timer.stop(), true);
        Ok(report)
    }

    /// One referee run
    pub async fn run_referee(&self, host: &dyn MatchHost) -> Result<RefereeReport> {
        let run_id = generate_run_id();
        let span = info_span!("referee", %run_id);
        self.referee_pass(run_id, host).instrument(span).await
    }

    async fn referee_pass(&self, run_id: Uuid, host: &dyn MatchHost) -> Result<RefereeReport> {
        let timer = self.metrics.start_timer();
        let now = current_timestamp();

        let players = self.store.load_players()?;
        let active_games = self.store.load_active_games()?;
        let history = self.store.load_history()?;

        let referee = Referee::new(self.config.ladder.clone())?;
        let outcome = referee
            .run(host, players, active_games, history, now)
            .await;
        self.metrics.record_referee_run(&outcome);

        let changed = outcome.run.changed;
        if changed {
            self.store.save_active_games(&outcome.run.active_games)?;
            self.store.save_players(&outcome.run.players)?;
            self.store.save_history(&outcome.run.history)?;
        } else {
            info!("No changes, stores left untouched");
        }

        self.finish(timer.stop(), changed);
        Ok(RefereeReport {
            run_id,
            summary: outcome.run.summary,
            failed_deletions: outcome.failed_deletions,
            state_written: changed,
        })
    }

    /// Current rank table
    pub fn standings(&self) -> Result<Vec<Standing>> {
        let players = self.store.load_players()?;
        Ok(standings(&players))
    }

    /// Open a single game between two players without touching ladder state
    pub async fn create_test_game(
        &self,
        host: &dyn MatchHost,
        template_id: TemplateId,
        p1: PlayerId,
        p2: PlayerId,
    ) -> Result<GameId> {
        if p1 == p2 {
            return Err(LadderError::ConfigurationError {
                message: "A test game needs two different players".to_string(),
            }
            .into());
        }

        let players = self.store.load_players()?;
        let template = self
            .store
            .load_templates()?
            .into_iter()
            .find(|template| template.id == template_id)
            .unwrap_or_else(|| Template {
                id: template_id,
                name: format!("template {}", template_id),
            });

        let planned = PlannedMatch {
            p1,
            p2,
            tier: PairingTier::Reliable,
            template,
        };
        let ranks = compute_ranks(&players);
        let request = self.matchmaker().game_request(&players, &ranks, &planned);

        let game_id = host.create_game(request).await?;
        info!(
            "Test game {} created for {} vs {}",
            game_id, planned.p1, planned.p2
        );
        Ok(game_id)
    }

    fn finish(&self, duration: std::time::Duration, state_written: bool) {
        self.metrics.record_run_complete(duration, state_written);

        if let Some(path) = &self.config.metrics.textfile_path {
            if let Err(e) = self.metrics.write_textfile(path) {
                warn!("Failed to export metrics to {}: {}", path.display(), e);
            }
        }
    }
}

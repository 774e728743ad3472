//! Metrics collection using Prometheus
//!
//! The ladder runs as a short-lived batch job, so metrics are not scraped.
//! Each run fills a private registry and writes it in the text exposition
//! format for node-exporter's textfile collector.

use crate::error::Result;
use crate::matchmaker::{MatchmakerRun, PlannedMatch};
use crate::referee::RefereeOutcome;
use anyhow::Context;
use prometheus::{
    Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Metrics collector for one ladder run
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    matchmaker_metrics: MatchmakerMetrics,

    referee_metrics: RefereeMetrics,

    run_metrics: RunMetrics,
}

/// Matchmaker metrics
#[derive(Clone)]
pub struct MatchmakerMetrics {
    /// Open slots found this run
    pub open_slots: IntGauge,

    /// Slots left without a partner
    pub unfilled_slots: IntGauge,

    /// Pairings planned by tier
    pub pairings_total: IntCounterVec,

    pub games_created_total: IntCounter,

    pub game_creation_failures_total: IntCounter,
}

/// Referee metrics
#[derive(Clone)]
pub struct RefereeMetrics {
    /// Resolved games by outcome
    pub games_resolved_total: IntCounterVec,

    pub strikes_total: IntCounter,

    pub strikes_cleared_total: IntCounter,

    pub poll_failures_total: IntCounter,

    pub deletion_failures_total: IntCounter,

    pub missing_players_total: IntCounter,
}

/// Per-run bookkeeping shared by both commands
#[derive(Clone)]
pub struct RunMetrics {
    /// Active games after the run
    pub active_games: IntGauge,

    pub run_duration_seconds: Gauge,

    /// Unix time of the last successful run
    pub last_success_timestamp: IntGauge,

    /// Whether the stores were rewritten (0/1)
    pub state_written: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        let matchmaker_metrics = MatchmakerMetrics::new(&registry)?;
        let referee_metrics = RefereeMetrics::new(&registry)?;
        let run_metrics = RunMetrics::new(&registry)?;

        Ok(Self {
            registry,
            matchmaker_metrics,
            referee_metrics,
            run_metrics,
        })
    }

    pub fn matchmaker(&self) -> &MatchmakerMetrics {
        &self.matchmaker_metrics
    }

    pub fn referee(&self) -> &RefereeMetrics {
        &self.referee_metrics
    }

    pub fn run(&self) -> &RunMetrics {
        &self.run_metrics
    }

    /// Record the slot counts and pairings of a plan
    pub fn record_plan(&self, open_slots: usize, unfilled_slots: usize, matches: &[PlannedMatch]) {
        self.matchmaker_metrics.open_slots.set(open_slots as i64);
        self.matchmaker_metrics
            .unfilled_slots
            .set(unfilled_slots as i64);
        for planned in matches {
            self.matchmaker_metrics
                .pairings_total
                .with_label_values(&[&planned.tier.to_string()])
                .inc();
        }
    }

    /// Record the outcome of a matchmaker submission pass
    pub fn record_matchmaker_run(&self, run: &MatchmakerRun) {
        self.matchmaker_metrics
            .games_created_total
            .inc_by(run.created.len() as u64);
        self.matchmaker_metrics
            .game_creation_failures_total
            .inc_by(run.failed.len() as u64);
        self.run_metrics
            .active_games
            .set(run.active_games.len() as i64);
    }

    /// Record the outcome of a referee pass
    pub fn record_referee_run(&self, outcome: &RefereeOutcome) {
        let summary = &outcome.run.summary;
        let resolved = &self.referee_metrics.games_resolved_total;
        resolved
            .with_label_values(&["decisive"])
            .inc_by(summary.decisive as u64);
        resolved
            .with_label_values(&["draw"])
            .inc_by(summary.draws as u64);
        resolved
            .with_label_values(&["lobby_timeout"])
            .inc_by(summary.lobby_timeouts as u64);
        resolved
            .with_label_values(&["terminated"])
            .inc_by(summary.terminated as u64);

        self.referee_metrics
            .strikes_total
            .inc_by(summary.strikes as u64);
        self.referee_metrics
            .strikes_cleared_total
            .inc_by(summary.strikes_cleared as u64);
        self.referee_metrics
            .poll_failures_total
            .inc_by(summary.poll_failures as u64);
        self.referee_metrics
            .deletion_failures_total
            .inc_by(outcome.failed_deletions.len() as u64);
        self.referee_metrics
            .missing_players_total
            .inc_by(summary.missing_players as u64);
        self.run_metrics
            .active_games
            .set(outcome.run.active_games.len() as i64);
    }

    /// Record a completed run
    pub fn record_run_complete(&self, duration: Duration, state_written: bool) {
        self.run_metrics
            .run_duration_seconds
            .set(duration.as_secs_f64());
        self.run_metrics
            .state_written
            .set(i64::from(state_written));
        self.run_metrics
            .last_success_timestamp
            .set(chrono::Utc::now().timestamp());
    }

    /// Encode every registered metric in the text exposition format
    pub fn encode(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        let output = encoder
            .encode_to_string(&metric_families)
            .context("Failed to encode metrics")?;
        debug!("Encoded {} metric families", metric_families.len());
        Ok(output)
    }

    /// Write the metrics to `path`, replacing any previous file atomically
    pub fn write_textfile(&self, path: &Path) -> Result<()> {
        let output = self.encode()?;
        let tmp = path.with_extension("prom.tmp");
        std::fs::write(&tmp, output)
            .with_context(|| format!("Failed to write metrics to {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move metrics into {}", path.display()))?;
        Ok(())
    }

    /// Create a timer for measuring run duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl MatchmakerMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let open_slots = IntGauge::new("ladder_open_slots", "Open slots found this run")?;
        registry.register(Box::new(open_slots.clone()))?;

        let unfilled_slots =
            IntGauge::new("ladder_unfilled_slots", "Slots left without a partner")?;
        registry.register(Box::new(unfilled_slots.clone()))?;

        let pairings_total = IntCounterVec::new(
            Opts::new("ladder_pairings_total", "Pairings planned by tier"),
            &["tier"],
        )?;
        registry.register(Box::new(pairings_total.clone()))?;

        let games_created_total =
            IntCounter::new("ladder_games_created_total", "Games created on the host")?;
        registry.register(Box::new(games_created_total.clone()))?;

        let game_creation_failures_total = IntCounter::new(
            "ladder_game_creation_failures_total",
            "Game creation requests that failed",
        )?;
        registry.register(Box::new(game_creation_failures_total.clone()))?;

        Ok(Self {
            open_slots,
            unfilled_slots,
            pairings_total,
            games_created_total,
            game_creation_failures_total,
        })
    }
}

impl RefereeMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let games_resolved_total = IntCounterVec::new(
            Opts::new("ladder_games_resolved_total", "Games archived by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(games_resolved_total.clone()))?;

        let strikes_total = IntCounter::new("ladder_strikes_total", "Strikes issued")?;
        registry.register(Box::new(strikes_total.clone()))?;

        let strikes_cleared_total = IntCounter::new(
            "ladder_strikes_cleared_total",
            "Players whose strikes were reset",
        )?;
        registry.register(Box::new(strikes_cleared_total.clone()))?;

        let poll_failures_total =
            IntCounter::new("ladder_poll_failures_total", "Game status polls that failed")?;
        registry.register(Box::new(poll_failures_total.clone()))?;

        let deletion_failures_total = IntCounter::new(
            "ladder_deletion_failures_total",
            "Timed-out lobbies the host failed to delete",
        )?;
        registry.register(Box::new(deletion_failures_total.clone()))?;

        let missing_players_total = IntCounter::new(
            "ladder_missing_players_total",
            "Updates skipped for unregistered players",
        )?;
        registry.register(Box::new(missing_players_total.clone()))?;

        Ok(Self {
            games_resolved_total,
            strikes_total,
            strikes_cleared_total,
            poll_failures_total,
            deletion_failures_total,
            missing_players_total,
        })
    }
}

impl RunMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let active_games = IntGauge::new("ladder_active_games", "Active games after the run")?;
        registry.register(Box::new(active_games.clone()))?;

        let run_duration_seconds =
            Gauge::new("ladder_run_duration_seconds", "Wall time of the last run")?;
        registry.register(Box::new(run_duration_seconds.clone()))?;

        let last_success_timestamp = IntGauge::new(
            "ladder_last_success_timestamp_seconds",
            "Unix time of the last successful run",
        )?;
        registry.register(Box::new(last_success_timestamp.clone()))?;

        let state_written = IntGauge::new(
            "ladder_state_written",
            "Whether the last run rewrote the state stores",
        )?;
        registry.register(Box::new(state_written.clone()))?;

        Ok(Self {
            active_games,
            run_duration_seconds,
            last_success_timestamp,
            state_written,
        })
    }
}

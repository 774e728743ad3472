//! Run metrics for the ladder jobs
//!
//! Counters and gauges for one matchmaker or referee run, exported as a
//! Prometheus textfile when a path is configured.

pub mod collector;

pub use collector::{
    MatchmakerMetrics, MetricsCollector, MetricsTimer, RefereeMetrics, RunMetrics,
};

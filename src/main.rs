//! Main entry point for the ladder batch jobs
//!
//! Each subcommand is one run: the scheduler invokes `matchmake` and
//! `referee` independently and they only share the persisted state.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ladder_referee::config::{validate_config, AppConfig};
use ladder_referee::host::WarzoneClient;
use ladder_referee::service::LadderApp;
use std::path::PathBuf;
use tracing::{error, info};

/// Ladder Referee - matchmaker and referee for a ranked 1v1 Warzone ladder
#[derive(Parser)]
#[command(
    name = "ladder-referee",
    version,
    about = "Matchmaker and referee for a ranked 1v1 Warzone ladder",
    long_about = "Pairs eligible ladder players into games on the Warzone match host and \
                 resolves finished, terminated and abandoned games into Elo updates and \
                 reliability strikes. Intended to be run periodically by a scheduler."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Data directory override
    #[arg(long, value_name = "DIR", help = "Directory holding the JSON state files")]
    data_dir: Option<PathBuf>,

    /// Metrics textfile override
    #[arg(long, value_name = "FILE", help = "Write Prometheus metrics to this file")]
    metrics_file: Option<PathBuf>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pair eligible players and create their games
    Matchmake {
        /// Plan pairings and log them without creating games or writing state
        #[arg(long)]
        dry_run: bool,
    },
    /// Resolve active games against the match host
    Referee,
    /// Print the current rank table
    Standings,
    /// Create one game between two players to check credentials
    TestGame {
        #[arg(long, value_name = "ID")]
        template: u64,
        #[arg(long, value_name = "PLAYER")]
        p1: String,
        #[arg(long, value_name = "PLAYER")]
        p2: String,
    },
    /// Validate configuration and exit
    CheckConfig,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from file or environment, then apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    if let Some(metrics_file) = &args.metrics_file {
        config.metrics.textfile_path = Some(metrics_file.clone());
    }

    validate_config(&config)?;
    Ok(config)
}

fn print_standings(app: &LadderApp) -> Result<()> {
    let table = app.standings()?;
    println!("{:>4}  {:<24} {:>6} {:>4} {:>6}", "Rank", "Player", "Elo", "Cap", "Missed");
    for row in table {
        println!(
            "{:>4}  {:<24} {:>6.0} {:>4} {:>6}",
            row.rank, row.name, row.elo, row.game_cap, row.missed_games
        );
    }
    Ok(())
}

async fn run(args: Args, config: AppConfig) -> Result<()> {
    let app = LadderApp::from_config(config.clone())?;

    match args.command {
        Command::Matchmake { dry_run } => {
            let host = WarzoneClient::new(&config.host)?;
            let report = app.run_matchmaker(&host, dry_run).await?;
            info!(
                "Matchmaker finished: {} planned, {} created, {} failed",
                report.planned,
                report.created.len(),
                report.failed
            );
        }
        Command::Referee => {
            let host = WarzoneClient::new(&config.host)?;
            let report = app.run_referee(&host).await?;
            info!(
                "Referee finished: {} resolved, {} still active",
                report.summary.resolved(),
                report.summary.still_active
            );
        }
        Command::Standings => print_standings(&app)?,
        Command::TestGame { template, p1, p2 } => {
            let host = WarzoneClient::new(&config.host)?;
            let game_id = app.create_test_game(&host, template, p1, p2).await?;
            println!("Created game {}", game_id);
        }
        Command::CheckConfig => {
            info!("Configuration validation successful");
            info!("   Service: {}", config.service.name);
            info!("   Data dir: {}", config.storage.data_dir.display());
            info!("   Match host: {}", config.host.base_url);
            info!("   Credentials: {}", config.host.has_credentials());
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args, config).await {
        error!("Run failed: {:#}", e);
        std::process::exit(1);
    }
}

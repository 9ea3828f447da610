//! NBA Parlay Engine - Entry Point
//!
//! Subcommands:
//! - `candidates`: fetch today's odds, annotate, list and save the bet pool
//! - `recommend --select 0,3,5`: parlays and stake sizes over picked bets
//! - `acquire [--once]`: scheduled fetch-and-save daemon
//! - `train`: fit the model on the saved training rows
//!
//! Wiring sequence:
//! 1. Parse CLI, load config.toml (defaults when absent) + validate
//! 2. Init tracing (JSON or plain, RUST_LOG overrides config)
//! 3. Build adapters (odds, schedule, model, snapshot store)
//! 4. Run the requested flow; the daemon runs until SIGINT

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use nba_parlay_engine::adapters::api::{NbaStatsClient, OddsApiClient};
use nba_parlay_engine::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use nba_parlay_engine::adapters::model::{LogisticModel, LogisticTrainer};
use nba_parlay_engine::adapters::persistence::JsonSnapshotStore;
use nba_parlay_engine::config::{self, AppConfig};
use nba_parlay_engine::domain::{BetCandidate, ParlayStatus, TeamReference};
use nba_parlay_engine::ports::repository::SnapshotRepository;
use nba_parlay_engine::usecases::acquisition::{AcquisitionJob, parse_run_times};
use nba_parlay_engine::usecases::recommender::fetch_inputs;
use nba_parlay_engine::usecases::{MarketInputs, ParlayRecommender, Recommendation};

#[derive(Parser)]
#[command(name = "nba-parlay")]
#[command(author, version, about = "NBA parlay combinations and Kelly staking", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List today's annotated bet candidates
    Candidates {
        /// Use the last saved snapshots instead of fetching
        #[arg(long)]
        offline: bool,
    },

    /// Build parlays over selected candidates and size the stakes
    ///
    /// Indices refer to the pool last listed by `candidates`, which is
    /// saved for this purpose. `--refresh` rebuilds the pool instead.
    Recommend {
        /// Candidate indices, as listed by `candidates`
        #[arg(short, long, value_delimiter = ',', required = true)]
        select: Vec<usize>,

        /// Flat stake per parlay
        #[arg(long)]
        stake: Option<f64>,

        /// Bankroll for Kelly sizing
        #[arg(long)]
        bankroll: Option<f64>,

        /// Maximum legs per parlay
        #[arg(long)]
        max_legs: Option<usize>,

        /// Target cumulative decimal odds
        #[arg(long)]
        target_odds: Option<f64>,

        /// Relative band half-width around the target
        #[arg(long)]
        margin: Option<f64>,

        /// Rebuild the pool instead of using the one `candidates` listed
        #[arg(long)]
        refresh: bool,

        /// With --refresh: build from the last saved snapshots instead of fetching
        #[arg(long)]
        offline: bool,
    },

    /// Fit the model on the saved training rows and overwrite the model file
    Train,

    /// Fetch and save schedule, teams, odds and training rows
    Acquire {
        /// Run a single pass and exit
        #[arg(long)]
        once: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Load configuration ───────────────────────────────
    let config = config::loader::load_or_default(&cli.config).context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config);

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting NBA parlay engine"
    );

    match cli.command {
        Commands::Candidates { offline } => {
            let recommender = ParlayRecommender::from_config(&config.parlay, &config.staking)?;
            let pool = load_pool(&config, &recommender, offline).await?;
            print_candidates(&pool);
            JsonSnapshotStore::new(&config.acquisition.data_dir)
                .await?
                .save_candidate_pool(&pool)
                .await?;
        }
        Commands::Recommend {
            select,
            stake,
            bankroll,
            max_legs,
            target_odds,
            margin,
            refresh,
            offline,
        } => {
            let mut parlay = config.parlay.clone();
            parlay.max_legs = max_legs.unwrap_or(parlay.max_legs);
            parlay.target_odds = target_odds.unwrap_or(parlay.target_odds);
            parlay.margin = margin.unwrap_or(parlay.margin);
            let mut staking = config.staking.clone();
            staking.stake = stake.unwrap_or(staking.stake);
            staking.bankroll = bankroll.unwrap_or(staking.bankroll);

            let recommender = ParlayRecommender::from_config(&parlay, &staking)?;
            let store = JsonSnapshotStore::new(&config.acquisition.data_dir).await?;
            let saved = if refresh { None } else { store.load_candidate_pool().await? };
            let pool = if let Some(pool) = saved {
                info!(candidates = pool.len(), "Using the pool listed by `candidates`");
                pool
            } else {
                if !refresh {
                    warn!("No listed pool saved; building a fresh one, run `candidates` to see its indices");
                }
                let pool = load_pool(&config, &recommender, offline).await?;
                store.save_candidate_pool(&pool).await?;
                pool
            };
            let recommendation = recommender.recommend(&pool, &select)?;
            print_recommendation(&recommender, &recommendation);
        }
        Commands::Train => run_training(&config).await?,
        Commands::Acquire { once } => run_acquisition(config, once).await?,
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.app.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Fetch (or load) market inputs and build the annotated pool.
async fn load_pool(
    config: &AppConfig,
    recommender: &ParlayRecommender,
    offline: bool,
) -> Result<Vec<BetCandidate>> {
    let inputs = if offline {
        load_snapshots(config).await?
    } else {
        let odds = OddsApiClient::new(config.odds_api.clone(), config::loader::odds_api_key()?)?;
        let schedule = NbaStatsClient::new(config.nba_stats.clone())?;
        fetch_inputs(&odds, &schedule, Local::now().date_naive()).await?
    };

    let model = LogisticModel::load(&config.model.path)?;
    Ok(recommender.prepare(&inputs, &model)?)
}

async fn load_snapshots(config: &AppConfig) -> Result<MarketInputs> {
    let store = JsonSnapshotStore::new(&config.acquisition.data_dir).await?;
    let odds = store
        .load_odds()
        .await?
        .context("No saved odds; run `nba-parlay acquire --once` first")?;
    let schedule = store
        .load_schedule()
        .await?
        .context("No saved schedule; run `nba-parlay acquire --once` first")?;
    let teams = store.load_teams().await?.unwrap_or_else(TeamReference::nba);
    Ok(MarketInputs { odds, schedule, teams })
}

/// Fit the model on the prepared bets and save it to the configured path.
async fn run_training(config: &AppConfig) -> Result<()> {
    let store = JsonSnapshotStore::new(&config.acquisition.data_dir).await?;
    let rows = store.load_prepared_bets().await?;
    anyhow::ensure!(
        !rows.is_empty(),
        "No prepared bets in {}; run `nba-parlay acquire --once` first",
        store.dir().display()
    );

    let (model, report) = LogisticTrainer::new(config.training.clone()).train(&rows)?;
    model.save(&config.model.path)?;

    println!("Rows: {} train, {} holdout", report.train_rows, report.test_rows);
    match report.roc_auc {
        Some(auc) => println!("Model ROC-AUC: {auc:.4}"),
        None => println!("Model ROC-AUC: n/a (single-class holdout)"),
    }
    println!("Model Accuracy: {:.4}", report.accuracy);
    println!("Model saved to {}", config.model.path);
    Ok(())
}

/// Run the acquisition job, once or as a daemon with metrics and probes.
async fn run_acquisition(config: AppConfig, once: bool) -> Result<()> {
    let odds = Arc::new(OddsApiClient::new(
        config.odds_api.clone(),
        config::loader::odds_api_key()?,
    )?);
    let schedule = Arc::new(NbaStatsClient::new(config.nba_stats.clone())?);
    let store = Arc::new(JsonSnapshotStore::new(&config.acquisition.data_dir).await?);
    let run_times = parse_run_times(&config.acquisition.run_times)?;

    let (job, status_rx) = AcquisitionJob::new(odds, schedule, store, run_times);
    let job = job.with_history_days(config.acquisition.history_days);

    if once {
        let report = job.run_once(Local::now().date_naive()).await?;
        println!(
            "Saved {} scheduled games, {} recent game rows, {} odds games, {} prepared bets",
            report.scheduled_games, report.historical_games, report.odds_games, report.prepared_bets
        );
        return Ok(());
    }

    // ── Shutdown channel ────────────────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── Metrics and health servers ──────────────────────────
    let mut servers = Vec::new();
    if config.metrics.enabled {
        let metrics = Arc::new(MetricsRegistry::new()?);
        tokio::spawn(Arc::clone(&metrics).track(status_rx.clone()));

        let metrics_shutdown = shutdown_tx.subscribe();
        let bind_address = config.metrics.bind_address.clone();
        servers.push(tokio::spawn(async move {
            if let Err(e) = metrics.serve(bind_address, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }));

        let health = HealthServer::new(Arc::new(HealthState::new(status_rx)), config.metrics.health_port);
        let health_shutdown = shutdown_tx.subscribe();
        servers.push(tokio::spawn(async move {
            if let Err(e) = health.run(health_shutdown).await {
                error!(error = %e, "Health server failed");
            }
        }));
    }

    // ── Acquisition loop ────────────────────────────────────
    let job_shutdown = shutdown_tx.subscribe();
    let job_handle = tokio::spawn(async move {
        if let Err(e) = job.run(job_shutdown).await {
            error!(error = %e, "Acquisition job failed");
        }
    });

    info!("Acquisition daemon running");

    signal::ctrl_c().await.context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");
    let _ = shutdown_tx.send(());

    if tokio::time::timeout(std::time::Duration::from_secs(30), job_handle)
        .await
        .is_err()
    {
        warn!("Acquisition job did not stop within 30s");
    }
    for server in servers {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), server).await;
    }

    info!("Shutdown complete");
    Ok(())
}

fn print_candidates(pool: &[BetCandidate]) {
    if pool.is_empty() {
        println!("No bet candidates available.");
        return;
    }
    println!(
        "{:>4}  {:<28} {:<16} {:<8} {:>7} {:>7} {:>8}",
        "#", "team", "bookmaker", "market", "price", "point", "prob"
    );
    for (i, bet) in pool.iter().enumerate() {
        println!(
            "{:>4}  {:<28} {:<16} {:<8} {:>7.2} {:>7.1} {:>8.4}",
            i,
            bet.team,
            bet.bookmaker,
            bet.bet_type.as_str(),
            bet.price,
            bet.point,
            bet.predicted_probability
        );
    }
}

fn print_recommendation(recommender: &ParlayRecommender, rec: &Recommendation) {
    let query = recommender.query();
    let (low, high) = query.band();
    let staking = recommender.staking();
    println!(
        "Target {:.2} ({low:.2} to {high:.2}), up to {} legs; stake {:.2}, bankroll {:.2}",
        query.target_odds,
        query.max_legs,
        staking.stake(),
        staking.bankroll()
    );
    println!();
    println!("Selected bets:");
    for bet in &rec.selected {
        println!(
            "  {:<40} {:>7.2} {:>8.4}",
            bet.label(),
            bet.price,
            bet.predicted_probability
        );
    }
    println!();

    match rec.status() {
        ParlayStatus::NoCandidates => {
            println!("No bets selected.");
            return;
        }
        ParlayStatus::NoneInBand => {
            println!("No parlays generated within the specified odds range.");
            return;
        }
        ParlayStatus::Found => {}
    }

    println!(
        "{:<60} {:>8} {:>8} {:>10} {:>10}",
        "parlay", "odds", "prob", "return", "kelly"
    );
    for stake in &rec.stakes {
        let edge = if stake.has_edge { "" } else { "  (no edge)" };
        println!(
            "{:<60} {:>8} {:>8} {:>10} {:>10}{edge}",
            stake.label,
            stake.cumulative_odds,
            stake.cumulative_probability,
            stake.potential_return,
            stake.kelly_stake
        );
    }
}

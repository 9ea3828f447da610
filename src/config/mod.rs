//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! The Odds API key is read from the environment (`ODDS_API_KEY`),
//! never from the file. Every section has working defaults, so an
//! empty file is a valid configuration.

pub mod loader;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Identity and logging.
  pub app: AppSection,
  /// Live odds provider.
  pub odds_api: OddsApiConfig,
  /// Schedule provider.
  pub nba_stats: NbaStatsConfig,
  /// Parlay enumeration parameters.
  pub parlay: ParlayConfig,
  /// Stake sizing parameters.
  pub staking: StakingConfig,
  /// Trained model location.
  pub model: ModelConfig,
  /// Model fitting parameters.
  pub training: TrainingConfig,
  /// Scheduled fetch-and-save job.
  pub acquisition: AcquisitionConfig,
  /// Metrics and health endpoints of the acquisition daemon.
  pub metrics: MetricsConfig,
}

/// Identity and logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
  /// Human-readable name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
  /// Emit JSON log lines instead of plain text.
  pub json_logs: bool,
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      name: "nba-parlay".to_string(),
      log_level: "info".to_string(),
      json_logs: false,
    }
  }
}

/// The Odds API v4 configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OddsApiConfig {
  /// API base URL.
  pub base_url: String,
  /// Sport key.
  pub sport: String,
  /// Bookmaker regions.
  pub regions: String,
  /// Comma-separated market keys.
  pub markets: String,
  /// Request timeout in seconds.
  pub timeout_seconds: u64,
  /// Client-side request quota.
  pub requests_per_minute: u32,
  /// Maximum retries on 429/5xx.
  pub max_retries: u32,
}

impl Default for OddsApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.the-odds-api.com/v4".to_string(),
      sport: "basketball_nba".to_string(),
      regions: "us".to_string(),
      markets: "h2h,spreads,totals".to_string(),
      timeout_seconds: 30,
      requests_per_minute: 30,
      max_retries: 3,
    }
  }
}

/// NBA stats scoreboard configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NbaStatsConfig {
  /// Stats API base URL.
  pub base_url: String,
  /// League identifier ("00" = NBA).
  pub league_id: String,
  /// Request timeout in seconds.
  pub timeout_seconds: u64,
}

impl Default for NbaStatsConfig {
  fn default() -> Self {
    Self {
      base_url: "https://stats.nba.com/stats".to_string(),
      league_id: "00".to_string(),
      timeout_seconds: 30,
    }
  }
}

/// Parlay enumeration configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParlayConfig {
  /// Maximum legs per parlay.
  pub max_legs: usize,
  /// Target cumulative decimal odds (2.00 = +100).
  pub target_odds: f64,
  /// Relative band half-width around the target.
  pub margin: f64,
  /// Maximum number of bets a user may select.
  pub selection_cap: usize,
}

impl Default for ParlayConfig {
  fn default() -> Self {
    Self {
      max_legs: 3,
      target_odds: 2.0,
      margin: 0.10,
      selection_cap: 3,
    }
  }
}

/// Stake sizing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
  /// Flat stake per simulated parlay.
  pub stake: f64,
  /// Bankroll for Kelly sizing.
  pub bankroll: f64,
}

impl Default for StakingConfig {
  fn default() -> Self {
    Self {
      stake: 10.0,
      bankroll: 1000.0,
    }
  }
}

/// Model location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
  /// Path to the JSON model file.
  pub path: String,
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      path: "models/nba_bet_model.json".to_string(),
    }
  }
}

/// Logistic model fitting configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
  /// Share of rows held out for evaluation.
  pub test_fraction: f64,
  /// Seed of the train/test shuffle.
  pub seed: u64,
  /// Gradient descent step size (on standardized features).
  pub learning_rate: f64,
  /// Full-batch gradient descent iterations.
  pub epochs: usize,
  /// L2 penalty on the weights.
  pub l2: f64,
}

impl Default for TrainingConfig {
  fn default() -> Self {
    Self {
      test_fraction: 0.2,
      seed: 42,
      learning_rate: 0.5,
      epochs: 2000,
      l2: 0.0,
    }
  }
}

/// Acquisition job configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
  /// Directory for snapshots.
  pub data_dir: String,
  /// Local run times, `HH:MM`.
  pub run_times: Vec<String>,
  /// Days of completed games saved with every run.
  pub history_days: u32,
}

impl Default for AcquisitionConfig {
  fn default() -> Self {
    Self {
      data_dir: "data".to_string(),
      // After midnight, mid-morning, pre-game
      run_times: vec!["00:01".to_string(), "10:00".to_string(), "16:00".to_string()],
      history_days: 30,
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  pub enabled: bool,
  /// Metrics server bind address.
  pub bind_address: String,
  /// Health check endpoint port.
  pub health_port: u16,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: "0.0.0.0:9090".to_string(),
      health_port: 8080,
    }
  }
}

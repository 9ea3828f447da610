//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;
use crate::domain::parlay::MAX_LEGS;
use crate::usecases::acquisition::parse_run_times;

/// Environment variable holding The Odds API key.
pub const ODDS_API_KEY_ENV: &str = "ODDS_API_KEY";

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    max_legs = config.parlay.max_legs,
    target_odds = config.parlay.target_odds,
    margin = config.parlay.margin,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Load the config file if it exists, otherwise use defaults.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
  if Path::new(path).exists() {
    load_config(path)
  } else {
    info!(path, "No config file found, using defaults");
    Ok(AppConfig::default())
  }
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Read the odds API key from the environment.
pub fn odds_api_key() -> Result<String> {
  let key = std::env::var(ODDS_API_KEY_ENV)
    .with_context(|| format!("{ODDS_API_KEY_ENV} is not set"))?;
  anyhow::ensure!(!key.trim().is_empty(), "{ODDS_API_KEY_ENV} is empty");
  Ok(key)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  // Parlay validation
  anyhow::ensure!(
    (1..=MAX_LEGS).contains(&config.parlay.max_legs),
    "parlay.max_legs must be in 1..={}, got {}",
    MAX_LEGS,
    config.parlay.max_legs
  );
  anyhow::ensure!(
    config.parlay.target_odds > 1.0,
    "parlay.target_odds must be above 1.0, got {}",
    config.parlay.target_odds
  );
  anyhow::ensure!(
    config.parlay.margin >= 0.0 && config.parlay.margin < 1.0,
    "parlay.margin must be in [0, 1), got {}",
    config.parlay.margin
  );
  anyhow::ensure!(
    config.parlay.selection_cap >= 1,
    "parlay.selection_cap must be at least 1"
  );

  // Staking validation
  anyhow::ensure!(
    config.staking.stake > 0.0,
    "staking.stake must be positive, got {}",
    config.staking.stake
  );
  anyhow::ensure!(
    config.staking.bankroll > 0.0,
    "staking.bankroll must be positive, got {}",
    config.staking.bankroll
  );

  // API validation
  anyhow::ensure!(
    !config.odds_api.base_url.is_empty(),
    "odds_api.base_url must not be empty"
  );
  anyhow::ensure!(
    config.odds_api.requests_per_minute > 0,
    "odds_api.requests_per_minute must be positive"
  );
  anyhow::ensure!(
    !config.nba_stats.base_url.is_empty(),
    "nba_stats.base_url must not be empty"
  );

  // Acquisition validation
  anyhow::ensure!(
    !config.acquisition.run_times.is_empty(),
    "acquisition.run_times must not be empty"
  );
  parse_run_times(&config.acquisition.run_times)?;
  anyhow::ensure!(
    config.acquisition.history_days >= 1,
    "acquisition.history_days must be at least 1"
  );

  // Training validation
  anyhow::ensure!(
    config.training.test_fraction > 0.0 && config.training.test_fraction < 1.0,
    "training.test_fraction must be in (0, 1), got {}",
    config.training.test_fraction
  );
  anyhow::ensure!(
    config.training.learning_rate > 0.0 && config.training.learning_rate.is_finite(),
    "training.learning_rate must be positive, got {}",
    config.training.learning_rate
  );
  anyhow::ensure!(config.training.epochs >= 1, "training.epochs must be at least 1");
  anyhow::ensure!(
    config.training.l2 >= 0.0,
    "training.l2 must not be negative, got {}",
    config.training.l2
  );

  Ok(())
}

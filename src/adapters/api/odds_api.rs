//! The Odds API v4 adapter.
//!
//! `GET {base}/sports/{sport}/odds/` with decimal prices and ISO dates.
//! Implements the `OddsFeed` port.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::config::OddsApiConfig;
use crate::ports::odds_feed::{OddsFeed, RawGameOdds};

use super::client::{HttpClient, HttpClientConfig};

/// Live odds client for The Odds API.
pub struct OddsApiClient {
  http: HttpClient,
  api_key: String,
  config: OddsApiConfig,
}

impl OddsApiClient {
  pub fn new(config: OddsApiConfig, api_key: String) -> Result<Self> {
    let http = HttpClient::new(HttpClientConfig {
      timeout: Duration::from_secs(config.timeout_seconds),
      requests_per_minute: config.requests_per_minute,
      max_retries: config.max_retries,
      ..HttpClientConfig::default()
    })?;
    Ok(Self {
      http,
      api_key,
      config,
    })
  }

  fn odds_url(&self) -> String {
    format!(
      "{}/sports/{}/odds/",
      self.config.base_url.trim_end_matches('/'),
      self.config.sport
    )
  }
}

#[async_trait]
impl OddsFeed for OddsApiClient {
  #[instrument(skip(self), fields(sport = %self.config.sport))]
  async fn fetch_odds(&self) -> Result<Vec<RawGameOdds>> {
    let query = [
      ("apiKey", self.api_key.as_str()),
      ("regions", self.config.regions.as_str()),
      ("markets", self.config.markets.as_str()),
      ("oddsFormat", "decimal"),
      ("dateFormat", "iso"),
    ];
    let response = self.http.get(&self.odds_url(), &query, "odds_api").await?;

    let remaining = response
      .headers()
      .get("x-requests-remaining")
      .and_then(|v| v.to_str().ok())
      .map(str::to_string);

    let games: Vec<RawGameOdds> = response
      .json()
      .await
      .context("Failed to decode odds payload")?;

    info!(
      games = games.len(),
      quota_remaining = remaining.as_deref().unwrap_or("unknown"),
      "Live odds fetched"
    );
    Ok(games)
  }
}

//! Odds Feed Port - Live Bookmaker Odds Interface
//!
//! Defines the raw odds payload (game → bookmaker → market → outcome)
//! and the trait for whatever fetches it. Field names follow the
//! The Odds API v4 JSON shape so the payload deserializes directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One priced outcome inside a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutcome {
  /// Team name (or "Over"/"Under" for totals).
  pub name: String,
  /// Decimal price.
  pub price: f64,
  /// Handicap or total line.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub point: Option<f64>,
}

/// One market (h2h, spreads, totals) offered by a bookmaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMarket {
  /// Market key.
  pub key: String,
  #[serde(default)]
  pub outcomes: Vec<RawOutcome>,
}

/// A bookmaker's markets for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBookmaker {
  /// Bookmaker key (e.g. `draftkings`).
  #[serde(default)]
  pub key: String,
  /// Display title (e.g. `DraftKings`).
  pub title: String,
  #[serde(default)]
  pub markets: Vec<RawMarket>,
}

/// One game with odds from every bookmaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGameOdds {
  /// Feed-assigned game identifier.
  pub id: String,
  /// Sport key (e.g. `basketball_nba`).
  pub sport_key: String,
  /// Tip-off time (ISO 8601), when provided.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub commence_time: Option<String>,
  pub home_team: String,
  pub away_team: String,
  #[serde(default)]
  pub bookmakers: Vec<RawBookmaker>,
}

/// Trait for live odds providers.
///
/// The fetch is a blocking step performed before the engine runs;
/// the engine itself only ever sees the returned payload.
#[async_trait]
pub trait OddsFeed: Send + Sync + 'static {
  /// Fetch current odds for every upcoming game of the configured sport.
  async fn fetch_odds(&self) -> anyhow::Result<Vec<RawGameOdds>>;
}

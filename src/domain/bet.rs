//! Bet candidate types.
//!
//! A `BetCandidate` is one priced outcome offered by one bookmaker for
//! one market of one game, flattened out of the nested odds payload.
//! Candidates are built fresh per odds fetch, annotated once with a
//! model probability, then consumed by the parlay enumerator.

use serde::{Deserialize, Serialize};

/// Betting market of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    /// Head-to-head (moneyline).
    H2h,
    /// Point spread.
    Spreads,
    /// Game total (over/under).
    Totals,
}

impl BetType {
    /// Parse an odds-feed market key. Unknown keys yield `None`.
    pub fn from_market_key(key: &str) -> Option<Self> {
        match key {
            "h2h" => Some(Self::H2h),
            "spreads" => Some(Self::Spreads),
            "totals" => Some(Self::Totals),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H2h => "h2h",
            Self::Spreads => "spreads",
            Self::Totals => "totals",
        }
    }
}

impl std::fmt::Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the game the outcome backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetSide {
    Home,
    Away,
}

impl BetSide {
    /// Resolve the side by exact name match against the game's teams.
    ///
    /// Returns `None` for outcomes naming neither team (e.g. "Over").
    pub fn resolve(team: &str, home_team: &str, away_team: &str) -> Option<Self> {
        if team == home_team {
            Some(Self::Home)
        } else if team == away_team {
            Some(Self::Away)
        } else {
            None
        }
    }
}

impl std::fmt::Display for BetSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::Away => write!(f, "Away"),
        }
    }
}

/// A single priced bet available for parlay construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetCandidate {
    /// Odds-feed game identifier.
    pub game_id: String,
    /// Sport key (e.g. `basketball_nba`).
    pub sport: String,
    /// Bookmaker display title.
    pub bookmaker: String,
    /// Team the outcome backs.
    pub team: String,
    /// Resolved home/away side.
    pub bet_side: BetSide,
    /// Market type.
    pub bet_type: BetType,
    /// Decimal price.
    pub price: f64,
    /// Handicap or total line; 0 when the market has none.
    #[serde(default)]
    pub point: f64,
    /// Visiting team resolved from the schedule, when known.
    #[serde(default)]
    pub away_team: Option<String>,
    /// Venue distance between `team` and `away_team` in miles (h2h only).
    #[serde(default)]
    pub travel_distance: f64,
    /// Model win probability; 0 until annotated.
    #[serde(default)]
    pub predicted_probability: f64,
}

/// Number of model input features.
pub const FEATURE_COUNT: usize = 4;

/// Feature names, in model input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["price_log", "point", "travel_distance", "is_home"];

/// Fixed-order model input row for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl BetCandidate {
    /// Build the model input row.
    ///
    /// `is_home` is 1 for head-to-head markets regardless of side; the
    /// trained model was fit on that encoding. Non-finite values are
    /// replaced by 0.
    pub fn features(&self) -> FeatureVector {
        let price_log = if self.price > 0.0 { self.price.ln() } else { 0.0 };
        let is_home = if self.bet_type == BetType::H2h { 1.0 } else { 0.0 };
        let raw = [price_log, self.point, self.travel_distance, is_home];
        FeatureVector(raw.map(|v| if v.is_finite() { v } else { 0.0 }))
    }

    /// Short display label: `TEAM @ BOOKMAKER`.
    pub fn label(&self) -> String {
        format!("{} @ {}", self.team, self.bookmaker)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal h2h candidate with the given price and probability.
    pub fn candidate(team: &str, price: f64, prob: f64) -> BetCandidate {
        BetCandidate {
            game_id: format!("game-{team}"),
            sport: "basketball_nba".to_string(),
            bookmaker: "DraftKings".to_string(),
            team: team.to_string(),
            bet_side: BetSide::Home,
            bet_type: BetType::H2h,
            price,
            point: 0.0,
            away_team: None,
            travel_distance: 0.0,
            predicted_probability: prob,
        }
    }
}

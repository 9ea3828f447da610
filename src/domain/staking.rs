//! Stake sizing for parlays.
//!
//! Two numbers per parlay: the simulated payout of a flat stake and the
//! full-Kelly stake for the given bankroll.
//!
//! Kelly formula for a binary outcome at decimal odds `d`:
//!   b  = d − 1          (net odds)
//!   f* = (p·b − (1−p)) / b
//! The stake is `f* × bankroll`, only when `p > 1/d`. No fractional
//! multiplier or position cap is applied; callers add their own risk cap.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};
use super::parlay::{Parlay, round_f64};

/// Full-Kelly fraction of bankroll for a bet at `odds` with win probability `prob`.
///
/// Zero when the net odds are zero or there is no positive edge.
pub fn kelly_fraction(prob: f64, odds: f64) -> f64 {
    let b = odds - 1.0;
    if b == 0.0 || odds <= 0.0 {
        return 0.0;
    }
    if prob <= 1.0 / odds {
        return 0.0;
    }
    (prob * b - (1.0 - prob)) / b
}

/// Staking calculator bound to a flat stake and a bankroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakingEngine {
    /// Flat stake per simulated parlay bet.
    stake: f64,
    /// Current bankroll for Kelly sizing.
    bankroll: f64,
}

impl StakingEngine {
    /// Creates a staking engine. Both amounts must be positive.
    pub fn new(stake: f64, bankroll: f64) -> EngineResult<Self> {
        if !stake.is_finite() || stake <= 0.0 {
            return Err(EngineError::invalid(format!(
                "stake must be positive, got {stake}"
            )));
        }
        if !bankroll.is_finite() || bankroll <= 0.0 {
            return Err(EngineError::invalid(format!(
                "bankroll must be positive, got {bankroll}"
            )));
        }
        Ok(Self { stake, bankroll })
    }

    pub fn stake(&self) -> f64 {
        self.stake
    }

    pub fn bankroll(&self) -> f64 {
        self.bankroll
    }

    /// Payout of the flat stake if every leg wins.
    pub fn potential_return(&self, parlay: &Parlay) -> f64 {
        parlay.cumulative_odds * self.stake
    }

    /// Full-Kelly stake in bankroll units; 0 without a positive edge.
    pub fn kelly_stake(&self, parlay: &Parlay) -> f64 {
        kelly_fraction(parlay.cumulative_probability, parlay.cumulative_odds) * self.bankroll
    }

    /// Stake recommendation for one parlay.
    pub fn recommend(&self, parlay: &Parlay) -> StakeRecommendation {
        StakeRecommendation {
            label: parlay.label(),
            legs: parlay.leg_count(),
            cumulative_odds: parlay.display_odds(),
            cumulative_probability: parlay.display_probability(),
            potential_return: round_f64(self.potential_return(parlay), 2),
            kelly_stake: round_f64(self.kelly_stake(parlay), 2),
            has_edge: parlay.has_edge(),
        }
    }

    /// Stake recommendations for a list of parlays, in input order.
    pub fn recommend_all(&self, parlays: &[Parlay]) -> Vec<StakeRecommendation> {
        parlays.iter().map(|p| self.recommend(p)).collect()
    }
}

/// Display-ready staking figures for one parlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecommendation {
    /// Parlay label (`TEAM @ BOOK, ...`).
    pub label: String,
    /// Number of legs.
    pub legs: usize,
    /// Cumulative decimal odds, 2 dp.
    pub cumulative_odds: Decimal,
    /// Joint win probability, 4 dp.
    pub cumulative_probability: Decimal,
    /// Flat-stake payout, 2 dp.
    pub potential_return: Decimal,
    /// Full-Kelly stake, 2 dp.
    pub kelly_stake: Decimal,
    /// Joint probability beats the break-even price.
    pub has_edge: bool,
}

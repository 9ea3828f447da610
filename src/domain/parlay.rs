//! Parlay enumeration.
//!
//! Builds every 1..=max_legs combination of candidates and keeps the
//! ones whose combined decimal odds land inside the target band
//! `[target·(1−margin), target·(1+margin)]`.
//!
//! Enumeration order is part of the contract: increasing leg count,
//! then lexicographic order of input positions (for 3 inputs and
//! 2 legs: `[0,1]`, `[0,2]`, `[1,2]`). Same input, same output.
//!
//! Joint probability is the product of leg probabilities. Legs are
//! treated as independent and two legs may come from the same game.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::bet::BetCandidate;
use super::error::{EngineError, EngineResult};

/// Hard upper bound on legs per parlay.
pub const MAX_LEGS: usize = 8;

/// Parameters of one enumeration pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParlayQuery {
    /// Maximum legs per parlay (1..=`MAX_LEGS`).
    pub max_legs: usize,
    /// Centre of the accepted cumulative-odds band (decimal odds).
    pub target_odds: f64,
    /// Relative half-width of the band (0.10 = ±10%).
    pub margin: f64,
}

impl Default for ParlayQuery {
    /// Up to 3 legs around even money (+100), ±10%.
    fn default() -> Self {
        Self {
            max_legs: 3,
            target_odds: 2.0,
            margin: 0.10,
        }
    }
}

impl ParlayQuery {
    pub fn new(max_legs: usize, target_odds: f64, margin: f64) -> EngineResult<Self> {
        let query = Self {
            max_legs,
            target_odds,
            margin,
        };
        query.validate()?;
        Ok(query)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.max_legs == 0 || self.max_legs > MAX_LEGS {
            return Err(EngineError::invalid(format!(
                "max_legs must be in 1..={MAX_LEGS}, got {}",
                self.max_legs
            )));
        }
        if !self.target_odds.is_finite() || self.target_odds <= 1.0 {
            return Err(EngineError::invalid(format!(
                "target_odds must be a decimal price above 1.0, got {}",
                self.target_odds
            )));
        }
        if !(0.0..1.0).contains(&self.margin) {
            return Err(EngineError::invalid(format!(
                "margin must be in [0, 1), got {}",
                self.margin
            )));
        }
        Ok(())
    }

    /// Inclusive `(low, high)` bounds of the accepted odds band.
    pub fn band(&self) -> (f64, f64) {
        (
            self.target_odds * (1.0 - self.margin),
            self.target_odds * (1.0 + self.margin),
        )
    }

    pub fn in_band(&self, odds: f64) -> bool {
        let (low, high) = self.band();
        low <= odds && odds <= high
    }
}

/// A multi-leg bet built from annotated candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parlay {
    /// Positions of the legs in the enumerated input list.
    pub leg_indices: Vec<usize>,
    /// The legs, in input order.
    pub legs: Vec<BetCandidate>,
    /// Product of leg prices (unrounded).
    pub cumulative_odds: f64,
    /// Product of leg probabilities (unrounded).
    pub cumulative_probability: f64,
}

impl Parlay {
    fn from_legs(indices: &[usize], pool: &[BetCandidate]) -> Self {
        let legs: Vec<BetCandidate> = indices.iter().map(|&i| pool[i].clone()).collect();
        let cumulative_odds = legs.iter().map(|l| l.price).product();
        let cumulative_probability = legs.iter().map(|l| l.predicted_probability).product();
        Self {
            leg_indices: indices.to_vec(),
            legs,
            cumulative_odds,
            cumulative_probability,
        }
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// `TEAM @ BOOK, TEAM @ BOOK, ...` in leg order.
    pub fn label(&self) -> String {
        self.legs
            .iter()
            .map(BetCandidate::label)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Cumulative odds rounded to 2 dp for display.
    pub fn display_odds(&self) -> Decimal {
        round_f64(self.cumulative_odds, 2)
    }

    /// Cumulative probability rounded to 4 dp for display.
    pub fn display_probability(&self) -> Decimal {
        round_f64(self.cumulative_probability, 4)
    }

    /// Whether the joint probability beats the break-even `1/odds`.
    pub fn has_edge(&self) -> bool {
        self.cumulative_odds > 0.0 && self.cumulative_probability > 1.0 / self.cumulative_odds
    }
}

/// Why a parlay set is (or is not) empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParlayStatus {
    /// At least one parlay landed in the band.
    Found,
    /// The candidate list was empty.
    NoCandidates,
    /// Candidates existed but no combination landed in the band.
    NoneInBand,
}

/// Result of one enumeration pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParlaySet {
    pub parlays: Vec<Parlay>,
    pub status: ParlayStatus,
    /// Number of combinations evaluated.
    pub examined: usize,
}

impl ParlaySet {
    pub fn is_empty(&self) -> bool {
        self.parlays.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parlays.len()
    }
}

/// Enumerate in-band parlays over `candidates`.
///
/// Returns an empty set (never an error) for an empty candidate list
/// or when nothing lands in the band; `status` tells the two apart.
pub fn enumerate_parlays(candidates: &[BetCandidate], query: &ParlayQuery) -> EngineResult<ParlaySet> {
    query.validate()?;

    if candidates.is_empty() {
        return Ok(ParlaySet {
            parlays: Vec::new(),
            status: ParlayStatus::NoCandidates,
            examined: 0,
        });
    }

    let mut parlays = Vec::new();
    let mut examined = 0usize;

    for r in 1..=query.max_legs.min(candidates.len()) {
        for indices in Combinations::new(candidates.len(), r) {
            examined += 1;
            let odds: f64 = indices.iter().map(|&i| candidates[i].price).product();
            if query.in_band(odds) {
                parlays.push(Parlay::from_legs(&indices, candidates));
            }
        }
    }

    let status = if parlays.is_empty() {
        ParlayStatus::NoneInBand
    } else {
        ParlayStatus::Found
    };

    Ok(ParlaySet {
        parlays,
        status,
        examined,
    })
}

/// Lexicographic r-combinations of `0..n`.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, r: usize) -> Self {
        Self {
            n,
            indices: (0..r).collect(),
            done: r > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        // Advance: rightmost index that can still move right
        let r = self.indices.len();
        let mut i = r;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] < self.n - r + i {
                self.indices[i] += 1;
                for j in i + 1..r {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }
}

/// Round an f64 half-away-from-zero to `dp` decimal places.
pub(crate) fn round_f64(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

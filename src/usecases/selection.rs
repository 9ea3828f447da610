//! Bet Selection - Picking Parlay Legs from the Candidate Pool
//!
//! The user picks candidates by their position in the displayed pool.
//! Picks beyond the cap are dropped (first picks win), mirroring a
//! multi-select widget limited to `cap` entries.

use tracing::warn;

use crate::domain::bet::BetCandidate;
use crate::domain::error::{EngineError, EngineResult};

/// Default number of bets a user may select for one parlay.
pub const DEFAULT_SELECTION_CAP: usize = 3;

/// Select candidates by pool index, in pick order.
///
/// Repeated indices are ignored. An index outside the pool is an
/// invalid argument.
pub fn select_bets(
  pool: &[BetCandidate],
  indices: &[usize],
  cap: usize,
) -> EngineResult<Vec<BetCandidate>> {
  if cap == 0 {
    return Err(EngineError::invalid("selection cap must be at least 1"));
  }
  if let Some(&bad) = indices.iter().find(|&&i| i >= pool.len()) {
    return Err(EngineError::invalid(format!(
      "selected index {bad} out of range for {} candidates",
      pool.len()
    )));
  }

  let mut unique: Vec<usize> = Vec::with_capacity(indices.len());
  for &i in indices {
    if !unique.contains(&i) {
      unique.push(i);
    }
  }

  if unique.len() > cap {
    warn!(selected = unique.len(), cap, "Too many bets selected, keeping the first picks");
    unique.truncate(cap);
  }

  Ok(unique.into_iter().map(|i| pool[i].clone()).collect())
}

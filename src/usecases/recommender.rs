//! Parlay Recommender - The Shared Engine Flow
//!
//! One user interaction is one pass through:
//! 1. Normalize raw odds into bet candidates
//! 2. Annotate candidates with model probabilities
//! 3. Select the user's legs (capped)
//! 4. Enumerate in-band parlays
//! 5. Size stakes (flat payout + Kelly)
//!
//! Inputs are injected values; the recommender holds no clock, scheduler
//! or cross-interaction state. Fetching inputs through the ports is a
//! separate step that completes before the engine runs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{ParlayConfig, StakingConfig};
use crate::domain::bet::BetCandidate;
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::parlay::{ParlayQuery, ParlaySet, ParlayStatus, enumerate_parlays};
use crate::domain::staking::{StakeRecommendation, StakingEngine};
use crate::domain::teams::TeamReference;
use crate::ports::model::ProbabilityModel;
use crate::ports::odds_feed::{OddsFeed, RawGameOdds};
use crate::ports::schedule::{ScheduleSource, ScheduleTable};

use super::annotator::annotate;
use super::normalizer::normalize;
use super::selection::select_bets;

/// Everything the engine consumes from its data collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketInputs {
  pub odds: Vec<RawGameOdds>,
  pub schedule: ScheduleTable,
  pub teams: TeamReference,
}

/// Fetch odds, schedule and team reference through the ports.
#[instrument(skip(odds_feed, schedule_source))]
pub async fn fetch_inputs<O, S>(
  odds_feed: &O,
  schedule_source: &S,
  date: NaiveDate,
) -> anyhow::Result<MarketInputs>
where
  O: OddsFeed + ?Sized,
  S: ScheduleSource + ?Sized,
{
  let schedule = schedule_source.games_on(date).await?;
  let teams = schedule_source.team_reference().await?;
  let odds = odds_feed.fetch_odds().await?;
  info!(
    games = odds.len(),
    scheduled = schedule.rows.len(),
    teams = teams.len(),
    "Market inputs fetched"
  );
  Ok(MarketInputs {
    odds,
    schedule,
    teams,
  })
}

/// Output of one recommendation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
  /// Unique ID of this pass, for log correlation.
  pub run_id: Uuid,
  pub generated_at: DateTime<Utc>,
  /// Legs the user selected, in pick order.
  pub selected: Vec<BetCandidate>,
  /// In-band parlays over the selection.
  pub parlays: ParlaySet,
  /// Stake sizing per parlay, same order as `parlays`.
  pub stakes: Vec<StakeRecommendation>,
}

impl Recommendation {
  pub fn status(&self) -> ParlayStatus {
    self.parlays.status
  }
}

/// Engine configured with parlay and staking parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParlayRecommender {
  query: ParlayQuery,
  staking: StakingEngine,
  selection_cap: usize,
}

impl ParlayRecommender {
  pub fn new(query: ParlayQuery, staking: StakingEngine, selection_cap: usize) -> EngineResult<Self> {
    query.validate()?;
    if selection_cap == 0 {
      return Err(EngineError::invalid("selection cap must be at least 1"));
    }
    Ok(Self {
      query,
      staking,
      selection_cap,
    })
  }

  pub fn from_config(parlay: &ParlayConfig, staking: &StakingConfig) -> EngineResult<Self> {
    Self::new(
      ParlayQuery::new(parlay.max_legs, parlay.target_odds, parlay.margin)?,
      StakingEngine::new(staking.stake, staking.bankroll)?,
      parlay.selection_cap,
    )
  }

  pub fn query(&self) -> &ParlayQuery {
    &self.query
  }

  pub fn staking(&self) -> &StakingEngine {
    &self.staking
  }

  /// Normalize and annotate the full candidate pool.
  #[instrument(skip_all)]
  pub fn prepare(
    &self,
    inputs: &MarketInputs,
    model: &dyn ProbabilityModel,
  ) -> EngineResult<Vec<BetCandidate>> {
    let candidates = normalize(&inputs.odds, &inputs.schedule, &inputs.teams)?;
    annotate(candidates, model)
  }

  /// Build parlays and stake sizes over the selected pool entries.
  #[instrument(skip(self, pool), fields(pool = pool.len()))]
  pub fn recommend(&self, pool: &[BetCandidate], selection: &[usize]) -> EngineResult<Recommendation> {
    let selected = select_bets(pool, selection, self.selection_cap)?;
    self.recommend_selected(selected)
  }

  /// Build parlays and stake sizes over an explicit leg list.
  pub fn recommend_selected(&self, selected: Vec<BetCandidate>) -> EngineResult<Recommendation> {
    let run_id = Uuid::new_v4();
    let parlays = enumerate_parlays(&selected, &self.query)?;
    let stakes = self.staking.recommend_all(&parlays.parlays);

    info!(
      run_id = %run_id,
      selected = selected.len(),
      examined = parlays.examined,
      parlays = parlays.len(),
      status = ?parlays.status,
      "Parlay recommendation computed"
    );

    Ok(Recommendation {
      run_id,
      generated_at: Utc::now(),
      selected,
      parlays,
      stakes,
    })
  }
}

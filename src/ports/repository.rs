//! Repository Port - Acquired Data Snapshots
//!
//! Persistence belongs to the acquisition job, not to the engine.
//! Each fetch overwrites the previous snapshot; prepared training
//! rows are written as JSON Lines.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::bet::BetCandidate;
use crate::domain::teams::TeamReference;

use super::odds_feed::RawGameOdds;
use super::schedule::ScheduleTable;

/// A normalized bet with its resolved outcome, used as a training row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledBet {
  #[serde(flatten)]
  pub candidate: BetCandidate,
  /// 1 if the backed team won, else 0.
  pub winning: u8,
}

/// Trait for snapshot storage of acquired data.
#[async_trait]
pub trait SnapshotRepository: Send + Sync + 'static {
  /// Save today's schedule table.
  async fn save_schedule(&self, table: &ScheduleTable) -> anyhow::Result<()>;

  /// Load the last saved schedule table.
  async fn load_schedule(&self) -> anyhow::Result<Option<ScheduleTable>>;

  /// Save the recent completed games table.
  async fn save_historical_games(&self, table: &ScheduleTable) -> anyhow::Result<()>;

  /// Load the last saved recent games table.
  async fn load_historical_games(&self) -> anyhow::Result<Option<ScheduleTable>>;

  /// Save the team reference table.
  async fn save_teams(&self, teams: &TeamReference) -> anyhow::Result<()>;

  /// Load the last saved team reference table.
  async fn load_teams(&self) -> anyhow::Result<Option<TeamReference>>;

  /// Save the raw odds payload.
  async fn save_odds(&self, odds: &[RawGameOdds]) -> anyhow::Result<()>;

  /// Load the last saved raw odds payload.
  async fn load_odds(&self) -> anyhow::Result<Option<Vec<RawGameOdds>>>;

  /// Overwrite the prepared training rows.
  async fn save_prepared_bets(&self, rows: &[LabeledBet]) -> anyhow::Result<()>;
}

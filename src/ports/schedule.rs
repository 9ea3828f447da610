//! Schedule Port - Game Schedule and Team Reference Interface
//!
//! The schedule provider returns a header + rows table. It is turned
//! into typed `ScheduledGame` records here, at the boundary, so a
//! missing column is reported once as a configuration error instead
//! of surfacing deep inside the engine.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::error::{EngineError, EngineResult};
use crate::domain::teams::TeamReference;

pub const GAME_ID: &str = "GAME_ID";
pub const VISITOR_TEAM_ID: &str = "VISITOR_TEAM_ID";
pub const HOME_TEAM_ID: &str = "HOME_TEAM_ID";
pub const HOME_TEAM_SCORE: &str = "HOME_TEAM_SCORE";
pub const VISITOR_TEAM_SCORE: &str = "VISITOR_TEAM_SCORE";

/// Tabular schedule as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTable {
  /// Column names.
  pub headers: Vec<String>,
  /// Rows, one value per header.
  pub rows: Vec<Vec<Value>>,
}

/// One scheduled game with the columns the engine uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
  pub game_id: String,
  pub visitor_team_id: u64,
  pub home_team_id: Option<u64>,
  pub home_score: Option<f64>,
  pub visitor_score: Option<f64>,
}

impl ScheduleTable {
  pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
    Self { headers, rows }
  }

  /// Position of a column by exact name.
  pub fn column(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h == name)
  }

  /// Whether both score columns are present.
  pub fn has_scores(&self) -> bool {
    self.column(HOME_TEAM_SCORE).is_some() && self.column(VISITOR_TEAM_SCORE).is_some()
  }

  /// Convert rows into typed games.
  ///
  /// Fails with a configuration error when `GAME_ID` or
  /// `VISITOR_TEAM_ID` is missing. Rows without a usable visitor id are
  /// skipped with a warning.
  pub fn games(&self) -> EngineResult<Vec<ScheduledGame>> {
    let game_col = self.column(GAME_ID).ok_or_else(|| {
      EngineError::Configuration(format!("schedule has no {GAME_ID} column"))
    })?;
    let visitor_col = self.column(VISITOR_TEAM_ID).ok_or_else(|| {
      EngineError::Configuration(format!(
        "no valid visitor team id column ({VISITOR_TEAM_ID}) in schedule"
      ))
    })?;
    let home_col = self.column(HOME_TEAM_ID);
    let home_score_col = self.column(HOME_TEAM_SCORE);
    let visitor_score_col = self.column(VISITOR_TEAM_SCORE);

    let mut games = Vec::with_capacity(self.rows.len());
    for row in &self.rows {
      let Some(game_id) = row.get(game_col).and_then(as_text) else {
        warn!("Schedule row without game id, skipping");
        continue;
      };
      let Some(visitor_team_id) = row.get(visitor_col).and_then(as_id) else {
        warn!(game_id = %game_id, "Missing visitor team id, skipping");
        continue;
      };
      let cell = |col: Option<usize>| col.and_then(|c| row.get(c));
      games.push(ScheduledGame {
        game_id,
        visitor_team_id,
        home_team_id: cell(home_col).and_then(as_id),
        home_score: cell(home_score_col).and_then(Value::as_f64),
        visitor_score: cell(visitor_score_col).and_then(Value::as_f64),
      });
    }
    Ok(games)
  }
}

fn as_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

fn as_id(value: &Value) -> Option<u64> {
  match value {
    Value::Number(n) => n
      .as_u64()
      .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

/// Trait for schedule and team reference providers.
#[async_trait]
pub trait ScheduleSource: Send + Sync + 'static {
  /// Today's (or the given date's) games.
  async fn games_on(&self, date: NaiveDate) -> anyhow::Result<ScheduleTable>;

  /// Completed games from `from` to `to`, inclusive, one row per team per game.
  async fn games_between(&self, from: NaiveDate, to: NaiveDate) -> anyhow::Result<ScheduleTable>;

  /// Franchise reference table.
  async fn team_reference(&self) -> anyhow::Result<TeamReference>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
  }

  #[test]
  fn test_games_parses_required_and_optional_columns() {
    let table = ScheduleTable::new(
      headers(&[GAME_ID, HOME_TEAM_ID, VISITOR_TEAM_ID, HOME_TEAM_SCORE, VISITOR_TEAM_SCORE]),
      vec![vec![json!("0022400001"), json!(1610612738), json!("1610612748"), json!(110), json!(104)]],
    );
    let games = table.games().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].game_id, "0022400001");
    assert_eq!(games[0].visitor_team_id, 1_610_612_748);
    assert_eq!(games[0].home_team_id, Some(1_610_612_738));
    assert_eq!(games[0].home_score, Some(110.0));
    assert!(table.has_scores());
  }

  #[test]
  fn test_missing_visitor_column_is_configuration_error() {
    let table = ScheduleTable::new(headers(&[GAME_ID, HOME_TEAM_ID]), vec![]);
    assert!(matches!(table.games(), Err(EngineError::Configuration(_))));
  }

  #[test]
  fn test_null_visitor_row_is_skipped() {
    let table = ScheduleTable::new(
      headers(&[GAME_ID, VISITOR_TEAM_ID]),
      vec![vec![json!("a"), Value::Null], vec![json!("b"), json!(1610612747)]],
    );
    let games = table.games().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].game_id, "b");
    assert!(!table.has_scores());
  }
}

//! NBA stats scoreboard adapter.
//!
//! `GET {base}/scoreboardv2?GameDate=YYYY-MM-DD&LeagueID=00&DayOffset=0`.
//! The response holds several `resultSets`; the `GameHeader` set becomes
//! the schedule table, and final points from `LineScore` are appended as
//! `HOME_TEAM_SCORE` / `VISITOR_TEAM_SCORE` when every game has them.
//! Recent results come from `leaguegamefinder` (team rows, date range).
//! Implements the `ScheduleSource` port.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::NbaStatsConfig;
use crate::domain::teams::TeamReference;
use crate::ports::schedule::{
  GAME_ID, HOME_TEAM_ID, HOME_TEAM_SCORE, ScheduleSource, ScheduleTable, VISITOR_TEAM_ID, VISITOR_TEAM_SCORE,
};

use super::client::{HttpClient, HttpClientConfig};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreboardResponse {
  result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSet {
  name: String,
  headers: Vec<String>,
  row_set: Vec<Vec<Value>>,
}

/// Schedule client for the NBA stats scoreboard.
pub struct NbaStatsClient {
  http: HttpClient,
  config: NbaStatsConfig,
}

impl NbaStatsClient {
  pub fn new(config: NbaStatsConfig) -> Result<Self> {
    // stats.nba.com rejects requests without browser-like headers
    let mut headers = HeaderMap::new();
    headers.insert(
      USER_AGENT,
      HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)"),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));

    let http = HttpClient::new(HttpClientConfig {
      timeout: Duration::from_secs(config.timeout_seconds),
      default_headers: headers,
      ..HttpClientConfig::default()
    })?;
    Ok(Self { http, config })
  }
}

#[async_trait]
impl ScheduleSource for NbaStatsClient {
  #[instrument(skip(self))]
  async fn games_on(&self, date: NaiveDate) -> Result<ScheduleTable> {
    let url = format!("{}/scoreboardv2", self.config.base_url.trim_end_matches('/'));
    let game_date = date.format("%Y-%m-%d").to_string();
    let query = [
      ("GameDate", game_date.as_str()),
      ("LeagueID", self.config.league_id.as_str()),
      ("DayOffset", "0"),
    ];
    let response = self.http.get(&url, &query, "scoreboardv2").await?;
    let body: ScoreboardResponse = response
      .json()
      .await
      .context("Failed to decode scoreboard payload")?;

    let table = schedule_from_scoreboard(body)?;
    info!(games = table.rows.len(), "Schedule fetched");
    Ok(table)
  }

  #[instrument(skip(self))]
  async fn games_between(&self, from: NaiveDate, to: NaiveDate) -> Result<ScheduleTable> {
    anyhow::ensure!(from <= to, "Empty date range {from}..{to}");
    let url = format!("{}/leaguegamefinder", self.config.base_url.trim_end_matches('/'));
    let date_from = from.format("%m/%d/%Y").to_string();
    let date_to = to.format("%m/%d/%Y").to_string();
    let query = [
      ("PlayerOrTeam", "T"),
      ("LeagueID", self.config.league_id.as_str()),
      ("DateFrom", date_from.as_str()),
      ("DateTo", date_to.as_str()),
    ];
    let response = self.http.get(&url, &query, "leaguegamefinder").await?;
    let body: ScoreboardResponse = response
      .json()
      .await
      .context("Failed to decode game finder payload")?;

    let table = history_from_game_finder(body)?;
    info!(rows = table.rows.len(), "Recent games fetched");
    Ok(table)
  }

  async fn team_reference(&self) -> Result<TeamReference> {
    Ok(TeamReference::nba())
  }
}

fn schedule_from_scoreboard(body: ScoreboardResponse) -> Result<ScheduleTable> {
  let mut sets: HashMap<String, ResultSet> = body
    .result_sets
    .into_iter()
    .map(|s| (s.name.clone(), s))
    .collect();

  let header = sets
    .remove("GameHeader")
    .context("Scoreboard response has no GameHeader result set")?;
  let mut table = ScheduleTable::new(header.headers, header.row_set);

  if let Some(line_score) = sets.remove("LineScore") {
    append_scores(&mut table, &line_score);
  }
  Ok(table)
}

/// The game finder returns a single result set of team game rows.
fn history_from_game_finder(body: ScoreboardResponse) -> Result<ScheduleTable> {
  let set = body
    .result_sets
    .into_iter()
    .next()
    .context("Game finder response has no result set")?;
  Ok(ScheduleTable::new(set.headers, set.row_set))
}

/// Append final scores from the `LineScore` set (one row per team per game).
fn append_scores(table: &mut ScheduleTable, line_score: &ResultSet) {
  let col = |name: &str| line_score.headers.iter().position(|h| h == name);
  let (Some(ls_game), Some(ls_team), Some(ls_pts)) = (col(GAME_ID), col("TEAM_ID"), col("PTS")) else {
    debug!("LineScore lacks GAME_ID/TEAM_ID/PTS, no scores appended");
    return;
  };
  let (Some(game_col), Some(home_col), Some(visitor_col)) = (
    table.column(GAME_ID),
    table.column(HOME_TEAM_ID),
    table.column(VISITOR_TEAM_ID),
  ) else {
    return;
  };

  let key = |v: &Value| match v {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  };
  let points: HashMap<(String, String), f64> = line_score
    .row_set
    .iter()
    .filter_map(|row| {
      let pts = row.get(ls_pts)?.as_f64()?;
      Some(((key(row.get(ls_game)?), key(row.get(ls_team)?)), pts))
    })
    .collect();

  let mut scores = Vec::with_capacity(table.rows.len());
  for row in &table.rows {
    let (Some(game), Some(home), Some(visitor)) = (row.get(game_col), row.get(home_col), row.get(visitor_col)) else {
      return;
    };
    let home_pts = points.get(&(key(game), key(home)));
    let visitor_pts = points.get(&(key(game), key(visitor)));
    match (home_pts, visitor_pts) {
      (Some(h), Some(v)) => scores.push((*h, *v)),
      // Unplayed games: leave the table unscored
      _ => return,
    }
  }

  table.headers.push(HOME_TEAM_SCORE.to_string());
  table.headers.push(VISITOR_TEAM_SCORE.to_string());
  for (row, (h, v)) in table.rows.iter_mut().zip(scores) {
    row.push(Value::from(h));
    row.push(Value::from(v));
  }
}

//! Acquisition Job - Scheduled Fetch-and-Save
//!
//! Independently restartable process that, at fixed local times of day,
//! pulls today's schedule, the team reference, the live odds and the
//! recent completed games, saves them as snapshots, and writes labeled
//! training rows.
//!
//! Runs once immediately on start. A failed run is retried every
//! 5 minutes until it succeeds or the next slot comes up.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{error, info, instrument, warn};

use crate::ports::odds_feed::OddsFeed;
use crate::ports::repository::SnapshotRepository;
use crate::ports::schedule::ScheduleSource;

use super::labeling::label_outcomes;
use super::normalizer::normalize;
use super::recommender::fetch_inputs;

/// Delay before retrying a failed run.
pub const RETRY_DELAY: Duration = Duration::from_secs(300);

/// Default window of completed games saved with every run.
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

/// Summary of one successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionReport {
  pub date: NaiveDate,
  pub scheduled_games: usize,
  /// Team game rows in the recent-games window.
  pub historical_games: usize,
  pub odds_games: usize,
  pub prepared_bets: usize,
}

/// Running totals published after every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
  pub runs: u64,
  pub failures: u64,
  pub last_report: Option<AcquisitionReport>,
  /// Whether the most recent run succeeded.
  pub healthy: bool,
}

/// Scheduled fetch-and-save job.
pub struct AcquisitionJob<O: OddsFeed, S: ScheduleSource, R: SnapshotRepository> {
  odds_feed: Arc<O>,
  schedule_source: Arc<S>,
  repository: Arc<R>,
  /// Local times of day to run, sorted.
  run_times: Vec<NaiveTime>,
  history_days: u32,
  status_tx: watch::Sender<JobStatus>,
}

impl<O: OddsFeed, S: ScheduleSource, R: SnapshotRepository> AcquisitionJob<O, S, R> {
  /// Create the job. Returns a receiver for status updates.
  pub fn new(
    odds_feed: Arc<O>,
    schedule_source: Arc<S>,
    repository: Arc<R>,
    mut run_times: Vec<NaiveTime>,
  ) -> (Self, watch::Receiver<JobStatus>) {
    run_times.sort();
    run_times.dedup();
    let (status_tx, status_rx) = watch::channel(JobStatus {
      healthy: true,
      ..JobStatus::default()
    });
    (
      Self {
        odds_feed,
        schedule_source,
        repository,
        run_times,
        history_days: DEFAULT_HISTORY_DAYS,
        status_tx,
      },
      status_rx,
    )
  }

  /// Size of the recent-games window, in days before the run date.
  #[must_use]
  pub fn with_history_days(mut self, days: u32) -> Self {
    self.history_days = days.max(1);
    self
  }

  /// Fetch, save and label data for `date`.
  #[instrument(skip(self))]
  pub async fn run_once(&self, date: NaiveDate) -> Result<AcquisitionReport> {
    let inputs = fetch_inputs(self.odds_feed.as_ref(), self.schedule_source.as_ref(), date)
      .await
      .context("Failed to fetch market inputs")?;
    let history_start = date
      .checked_sub_days(Days::new(u64::from(self.history_days)))
      .unwrap_or(date);
    let history = self
      .schedule_source
      .games_between(history_start, date)
      .await
      .context("Failed to fetch recent games")?;

    self.repository.save_schedule(&inputs.schedule).await?;
    self.repository.save_historical_games(&history).await?;
    self.repository.save_teams(&inputs.teams).await?;
    self.repository.save_odds(&inputs.odds).await?;

    let candidates = normalize(&inputs.odds, &inputs.schedule, &inputs.teams)?;
    let rows = label_outcomes(&candidates, &inputs.schedule, &inputs.teams)?;
    self.repository.save_prepared_bets(&rows).await?;

    let report = AcquisitionReport {
      date,
      scheduled_games: inputs.schedule.rows.len(),
      historical_games: history.rows.len(),
      odds_games: inputs.odds.len(),
      prepared_bets: rows.len(),
    };
    info!(
      scheduled_games = report.scheduled_games,
      historical_games = report.historical_games,
      odds_games = report.odds_games,
      prepared_bets = report.prepared_bets,
      "Data fetched and saved"
    );
    Ok(report)
  }

  /// Run immediately, then at every configured time until shutdown.
  #[instrument(skip(self, shutdown_rx), name = "acquisition_loop")]
  pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
    anyhow::ensure!(!self.run_times.is_empty(), "No acquisition run times configured");
    info!(slots = self.run_times.len(), "Starting acquisition job");

    loop {
      // Retry until success or until the next slot would start anyway.
      let deadline = next_run_after(Local::now().naive_local(), &self.run_times);
      let retry = chrono::Duration::from_std(RETRY_DELAY).unwrap_or_else(|_| chrono::Duration::zero());
      loop {
        if self.attempt().await {
          break;
        }
        if Local::now().naive_local() + retry > deadline {
          break;
        }
        tokio::select! {
          _ = shutdown_rx.recv() => {
            info!("Acquisition job received shutdown signal");
            return Ok(());
          }
          () = tokio::time::sleep(RETRY_DELAY) => {}
        }
      }

      let now = Local::now().naive_local();
      let next = next_run_after(now, &self.run_times);
      let wait = (next - now).to_std().unwrap_or_default();
      info!(next_run = %next, "Acquisition run scheduled");

      tokio::select! {
        _ = shutdown_rx.recv() => {
          info!("Acquisition job received shutdown signal");
          return Ok(());
        }
        () = tokio::time::sleep(wait) => {}
      }
    }
  }

  /// One run for today; publishes status. Returns whether it succeeded.
  async fn attempt(&self) -> bool {
    let today = Local::now().date_naive();
    let result = self.run_once(today).await;
    let ok = result.is_ok();
    self.status_tx.send_modify(|status| {
      status.runs += 1;
      status.healthy = ok;
      match &result {
        Ok(report) => status.last_report = Some(report.clone()),
        Err(_) => status.failures += 1,
      }
    });
    if let Err(e) = result {
      error!(error = %format!("{e:#}"), "Acquisition run failed");
      warn!(retry_secs = RETRY_DELAY.as_secs(), "Will retry acquisition");
    }
    ok
  }
}

/// First slot strictly after `now`: later today, else the first slot tomorrow.
///
/// `times` must be non-empty and sorted.
pub fn next_run_after(now: NaiveDateTime, times: &[NaiveTime]) -> NaiveDateTime {
  let today = now.date();
  if let Some(t) = times.iter().find(|t| today.and_time(**t) > now) {
    return today.and_time(*t);
  }
  let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
  tomorrow.and_time(times.first().copied().unwrap_or(NaiveTime::MIN))
}

/// Parse `HH:MM` slot strings.
pub fn parse_run_times(times: &[String]) -> Result<Vec<NaiveTime>> {
  times
    .iter()
    .map(|t| {
      NaiveTime::parse_from_str(t, "%H:%M").with_context(|| format!("Invalid run time '{t}', expected HH:MM"))
    })
    .collect()
}

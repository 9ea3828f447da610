//! Snapshot Store - Atomic JSON Snapshots of Acquired Data
//!
//! One file per dataset in the data directory, each overwritten on
//! every fetch:
//! - `today_games.json`: schedule table
//! - `historical_games.json`: recent completed games
//! - `teams_info.json`: team reference
//! - `live_odds.json`: raw odds payload
//! - `prepared_bets.jsonl`: labeled training rows, one per line
//! - `candidate_pool.json`: the last annotated pool shown to the user
//!
//! Writes go to a `.tmp` sibling first and are renamed into place.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::domain::bet::BetCandidate;
use crate::domain::teams::TeamReference;
use crate::ports::odds_feed::RawGameOdds;
use crate::ports::repository::{LabeledBet, SnapshotRepository};
use crate::ports::schedule::ScheduleTable;

const SCHEDULE_FILE: &str = "today_games.json";
const HISTORY_FILE: &str = "historical_games.json";
const TEAMS_FILE: &str = "teams_info.json";
const ODDS_FILE: &str = "live_odds.json";
const PREPARED_BETS_FILE: &str = "prepared_bets.jsonl";
const POOL_FILE: &str = "candidate_pool.json";

/// JSON file store for acquisition snapshots.
pub struct JsonSnapshotStore {
    dir: PathBuf,
}

impl JsonSnapshotStore {
    /// Create a store rooted at `data_dir`, creating the directory.
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Directory holding the snapshots.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `contents` to `name` via tmp file and rename.
    async fn write_atomic(&self, name: &str, contents: &[u8]) -> Result<()> {
        let path = self.dir.join(name);
        let tmp_path = self.dir.join(format!("{name}.tmp"));

        fs::write(&tmp_path, contents)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to rename {}", tmp_path.display()))?;

        debug!(path = %path.display(), bytes = contents.len(), "Snapshot written");
        Ok(())
    }

    async fn save_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)
            .with_context(|| format!("Failed to serialize {name}"))?;
        self.write_atomic(name, &json).await
    }

    /// Whether `path` exists. Errors other than "not found" are reported.
    async fn exists(path: &Path) -> Result<bool> {
        fs::try_exists(path)
            .await
            .with_context(|| format!("Failed to check {}", path.display()))
    }

    /// Read `name`; `None` if it has never been written.
    async fn load_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.dir.join(name);
        if !Self::exists(&path).await? {
            debug!(path = %path.display(), "No snapshot yet");
            return Ok(None);
        }
        let json = fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value = serde_json::from_slice(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    /// Read back the prepared training rows.
    pub async fn load_prepared_bets(&self) -> Result<Vec<LabeledBet>> {
        let path = self.dir.join(PREPARED_BETS_FILE);
        if !Self::exists(&path).await? {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Bad training row at line {}", i + 1))
            })
            .collect()
    }

    /// Save the annotated pool whose indices the user selects from.
    pub async fn save_candidate_pool(&self, pool: &[BetCandidate]) -> Result<()> {
        self.save_json(POOL_FILE, pool).await
    }

    /// Load the last saved annotated pool.
    pub async fn load_candidate_pool(&self) -> Result<Option<Vec<BetCandidate>>> {
        self.load_json(POOL_FILE).await
    }
}

#[async_trait]
impl SnapshotRepository for JsonSnapshotStore {
    async fn save_schedule(&self, table: &ScheduleTable) -> Result<()> {
        self.save_json(SCHEDULE_FILE, table).await
    }

    async fn load_schedule(&self) -> Result<Option<ScheduleTable>> {
        self.load_json(SCHEDULE_FILE).await
    }

    async fn save_historical_games(&self, table: &ScheduleTable) -> Result<()> {
        self.save_json(HISTORY_FILE, table).await
    }

    async fn load_historical_games(&self) -> Result<Option<ScheduleTable>> {
        self.load_json(HISTORY_FILE).await
    }

    async fn save_teams(&self, teams: &TeamReference) -> Result<()> {
        self.save_json(TEAMS_FILE, teams).await
    }

    async fn load_teams(&self) -> Result<Option<TeamReference>> {
        self.load_json(TEAMS_FILE).await
    }

    async fn save_odds(&self, odds: &[RawGameOdds]) -> Result<()> {
        self.save_json(ODDS_FILE, odds).await
    }

    async fn load_odds(&self) -> Result<Option<Vec<RawGameOdds>>> {
        self.load_json(ODDS_FILE).await
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn save_prepared_bets(&self, rows: &[LabeledBet]) -> Result<()> {
        let mut buf = Vec::new();
        for row in rows {
            serde_json::to_writer(&mut buf, row).context("Failed to serialize training row")?;
            buf.push(b'\n');
        }
        self.write_atomic(PREPARED_BETS_FILE, &buf).await?;
        info!(path = %self.dir.join(PREPARED_BETS_FILE).display(), "Prepared bets saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bet::fixtures::candidate;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_snapshots_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path()).await.unwrap();
        assert!(store.load_schedule().await.unwrap().is_none());
        assert!(store.load_odds().await.unwrap().is_none());
        assert!(store.load_prepared_bets().await.unwrap().is_empty());
        assert!(store.load_candidate_pool().await.unwrap().is_none());
        assert!(store.load_historical_games().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_data_dir_is_error_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let store = JsonSnapshotStore::new(&data).await.unwrap();

        // Replace the directory with a plain file: lookups below it fail with ENOTDIR
        std::fs::remove_dir(&data).unwrap();
        std::fs::write(&data, b"not a directory").unwrap();

        assert!(store.load_odds().await.is_err());
        assert!(store.load_prepared_bets().await.is_err());
    }

    #[tokio::test]
    async fn test_candidate_pool_and_history_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path()).await.unwrap();

        let pool = vec![candidate("Boston Celtics", 1.4, 0.71), candidate("Miami Heat", 3.1, 0.3)];
        store.save_candidate_pool(&pool).await.unwrap();
        assert_eq!(store.load_candidate_pool().await.unwrap(), Some(pool));

        let history = ScheduleTable::new(
            vec!["GAME_ID".to_string(), "TEAM_ID".to_string(), "WL".to_string()],
            vec![vec![json!("0022400550"), json!(1_610_612_738_u64), json!("W")]],
        );
        store.save_historical_games(&history).await.unwrap();
        assert_eq!(store.load_historical_games().await.unwrap(), Some(history));
    }

    #[tokio::test]
    async fn test_schedule_and_teams_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("nested")).await.unwrap();

        let table = ScheduleTable::new(
            vec!["GAME_ID".to_string(), "VISITOR_TEAM_ID".to_string()],
            vec![vec![json!("0022400561"), json!(1_610_612_748_u64)]],
        );
        store.save_schedule(&table).await.unwrap();
        store.save_teams(&TeamReference::nba()).await.unwrap();

        assert_eq!(store.load_schedule().await.unwrap(), Some(table));
        assert_eq!(store.load_teams().await.unwrap(), Some(TeamReference::nba()));
        assert!(!store.dir().join("today_games.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_prepared_bets_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path()).await.unwrap();

        let rows = vec![
            LabeledBet { candidate: candidate("Boston Celtics", 1.4, 0.0), winning: 1 },
            LabeledBet { candidate: candidate("Miami Heat", 3.1, 0.0), winning: 0 },
        ];
        store.save_prepared_bets(&rows).await.unwrap();
        store.save_prepared_bets(&rows[..1]).await.unwrap();

        let loaded = store.load_prepared_bets().await.unwrap();
        assert_eq!(loaded, rows[..1].to_vec());
    }
}

//! Integration Tests - Ports, Use Cases and Mock Adapters
//!
//! Drives the recommender flow and the acquisition job through mocked
//! odds, schedule and snapshot ports.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;

use chrono::NaiveDate;
use mockall::mock;
use mockall::predicate::*;
use rust_decimal_macros::dec;
use serde_json::json;

use nba_parlay_engine::domain::{BetType, FeatureVector, ParlayStatus, TeamReference};
use nba_parlay_engine::ports::model::ProbabilityModel;
use nba_parlay_engine::ports::odds_feed::{OddsFeed, RawBookmaker, RawGameOdds, RawMarket, RawOutcome};
use nba_parlay_engine::ports::repository::{LabeledBet, SnapshotRepository};
use nba_parlay_engine::ports::schedule::{
    GAME_ID, HOME_TEAM_ID, HOME_TEAM_SCORE, ScheduleSource, ScheduleTable, VISITOR_TEAM_ID,
    VISITOR_TEAM_SCORE,
};
use nba_parlay_engine::usecases::ParlayRecommender;
use nba_parlay_engine::usecases::acquisition::AcquisitionJob;
use nba_parlay_engine::usecases::recommender::fetch_inputs;

// ---- Mock Definitions ----

mock! {
    pub Odds {}

    #[async_trait::async_trait]
    impl OddsFeed for Odds {
        async fn fetch_odds(&self) -> anyhow::Result<Vec<RawGameOdds>>;
    }
}

mock! {
    pub Schedule {}

    #[async_trait::async_trait]
    impl ScheduleSource for Schedule {
        async fn games_on(&self, date: NaiveDate) -> anyhow::Result<ScheduleTable>;
        async fn games_between(&self, from: NaiveDate, to: NaiveDate) -> anyhow::Result<ScheduleTable>;
        async fn team_reference(&self) -> anyhow::Result<TeamReference>;
    }
}

mock! {
    pub Store {}

    #[async_trait::async_trait]
    impl SnapshotRepository for Store {
        async fn save_schedule(&self, table: &ScheduleTable) -> anyhow::Result<()>;
        async fn load_schedule(&self) -> anyhow::Result<Option<ScheduleTable>>;
        async fn save_historical_games(&self, table: &ScheduleTable) -> anyhow::Result<()>;
        async fn load_historical_games(&self) -> anyhow::Result<Option<ScheduleTable>>;
        async fn save_teams(&self, teams: &TeamReference) -> anyhow::Result<()>;
        async fn load_teams(&self) -> anyhow::Result<Option<TeamReference>>;
        async fn save_odds(&self, odds: &[RawGameOdds]) -> anyhow::Result<()>;
        async fn load_odds(&self) -> anyhow::Result<Option<Vec<RawGameOdds>>>;
        async fn save_prepared_bets(&self, rows: &[LabeledBet]) -> anyhow::Result<()>;
    }
}

// ---- Fixtures ----

const CELTICS: u64 = 1_610_612_738;
const HEAT: u64 = 1_610_612_748;

fn outcome(name: &str, price: f64, point: Option<f64>) -> RawOutcome {
    RawOutcome {
        name: name.to_string(),
        price,
        point,
    }
}

/// Heat at Celtics: h2h 1.40 / 3.10, spreads 1.91 / 1.91, totals.
fn heat_at_celtics() -> RawGameOdds {
    RawGameOdds {
        id: "g1".to_string(),
        sport_key: "basketball_nba".to_string(),
        commence_time: Some("2025-01-15T00:40:00Z".to_string()),
        home_team: "Boston Celtics".to_string(),
        away_team: "Miami Heat".to_string(),
        bookmakers: vec![RawBookmaker {
            key: "draftkings".to_string(),
            title: "DraftKings".to_string(),
            markets: vec![
                RawMarket {
                    key: "h2h".to_string(),
                    outcomes: vec![
                        outcome("Boston Celtics", 1.40, None),
                        outcome("Miami Heat", 3.10, None),
                    ],
                },
                RawMarket {
                    key: "spreads".to_string(),
                    outcomes: vec![
                        outcome("Boston Celtics", 1.91, Some(-7.5)),
                        outcome("Miami Heat", 1.91, Some(7.5)),
                    ],
                },
                RawMarket {
                    key: "totals".to_string(),
                    outcomes: vec![
                        outcome("Over", 1.87, Some(215.5)),
                        outcome("Under", 1.95, Some(215.5)),
                    ],
                },
            ],
        }],
    }
}

/// Final: Celtics 110, Heat 100.
fn final_schedule() -> ScheduleTable {
    ScheduleTable::new(
        vec![
            GAME_ID.to_string(),
            HOME_TEAM_ID.to_string(),
            VISITOR_TEAM_ID.to_string(),
            HOME_TEAM_SCORE.to_string(),
            VISITOR_TEAM_SCORE.to_string(),
        ],
        vec![vec![json!("g1"), json!(CELTICS), json!(HEAT), json!(110), json!(100)]],
    )
}

fn game_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

/// Two team rows of one completed game.
fn recent_games() -> ScheduleTable {
    ScheduleTable::new(
        vec![GAME_ID.to_string(), "TEAM_ID".to_string(), "WL".to_string()],
        vec![
            vec![json!("g0"), json!(CELTICS), json!("W")],
            vec![json!("g0"), json!(HEAT), json!("L")],
        ],
    )
}

/// Bookmaker-implied probability with a 5% edge.
struct ImpliedPlusEdge;

impl ProbabilityModel for ImpliedPlusEdge {
    fn predict_proba(&self, rows: &[FeatureVector]) -> anyhow::Result<Vec<f64>> {
        Ok(rows
            .iter()
            .map(|r| ((-r.0[0]).exp() * 1.05).min(1.0))
            .collect())
    }
}

fn mock_sources() -> (MockOdds, MockSchedule) {
    let mut odds = MockOdds::new();
    odds.expect_fetch_odds()
        .times(1)
        .returning(|| Ok(vec![heat_at_celtics()]));

    let mut schedule = MockSchedule::new();
    schedule
        .expect_games_on()
        .with(eq(game_day()))
        .times(1)
        .returning(|_| Ok(final_schedule()));
    schedule
        .expect_team_reference()
        .times(1)
        .returning(|| Ok(TeamReference::nba()));

    (odds, schedule)
}

// ---- Integration Tests ----

#[tokio::test]
async fn test_fetch_prepare_and_recommend() {
    let (odds, schedule) = mock_sources();
    let inputs = fetch_inputs(&odds, &schedule, game_day()).await.unwrap();
    assert_eq!(inputs.odds.len(), 1);
    assert_eq!(inputs.teams.len(), 30);

    let recommender = ParlayRecommender::from_config(&Default::default(), &Default::default()).unwrap();
    let pool = recommender.prepare(&inputs, &ImpliedPlusEdge).unwrap();

    // Totals outcomes name neither team
    assert_eq!(pool.len(), 4);
    assert!(pool.iter().all(|c| c.predicted_probability > 0.0));
    let celtics_h2h = &pool[0];
    assert_eq!(celtics_h2h.bet_type, BetType::H2h);
    assert_eq!(celtics_h2h.away_team.as_deref(), Some("Miami Heat"));
    assert!(celtics_h2h.travel_distance > 1000.0);
    assert_eq!(pool[2].travel_distance, 0.0);

    // Celtics ML (1.40) and Celtics -7.5 (1.91): only the spread single is in [1.8, 2.2]
    let rec = recommender.recommend(&pool, &[0, 2]).unwrap();
    assert_eq!(rec.status(), ParlayStatus::Found);
    assert_eq!(rec.parlays.len(), 1);
    assert_eq!(rec.parlays.examined, 3);

    let stake = &rec.stakes[0];
    assert_eq!(stake.legs, 1);
    assert_eq!(stake.potential_return, dec!(19.10));
    assert!(stake.has_edge);
    assert!(stake.kelly_stake > dec!(0));
}

#[tokio::test]
async fn test_recommend_none_in_band_is_not_an_error() {
    let (odds, schedule) = mock_sources();
    let inputs = fetch_inputs(&odds, &schedule, game_day()).await.unwrap();
    let recommender = ParlayRecommender::from_config(&Default::default(), &Default::default()).unwrap();
    let pool = recommender.prepare(&inputs, &ImpliedPlusEdge).unwrap();

    // 1.40, 3.10 and 4.34 all miss [1.8, 2.2]
    let rec = recommender.recommend(&pool, &[0, 1]).unwrap();
    assert_eq!(rec.status(), ParlayStatus::NoneInBand);
    assert!(rec.stakes.is_empty());
}

#[tokio::test]
async fn test_acquisition_saves_snapshots_and_labels() {
    let (odds, mut schedule) = mock_sources();
    schedule
        .expect_games_between()
        .with(eq(NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()), eq(game_day()))
        .times(1)
        .returning(|_, _| Ok(recent_games()));

    let mut store = MockStore::new();
    store
        .expect_save_historical_games()
        .withf(|table| table.rows.len() == 2)
        .times(1)
        .returning(|_| Ok(()));
    store
        .expect_save_schedule()
        .withf(|table| table.has_scores())
        .times(1)
        .returning(|_| Ok(()));
    store
        .expect_save_teams()
        .withf(|teams| teams.len() == 30)
        .times(1)
        .returning(|_| Ok(()));
    store
        .expect_save_odds()
        .withf(|odds| odds.len() == 1)
        .times(1)
        .returning(|_| Ok(()));
    store
        .expect_save_prepared_bets()
        .withf(|rows| {
            rows.len() == 4
                && rows
                    .iter()
                    .all(|r| (r.candidate.team == "Boston Celtics") == (r.winning == 1))
        })
        .times(1)
        .returning(|_| Ok(()));

    let (job, status_rx) = AcquisitionJob::new(
        Arc::new(odds),
        Arc::new(schedule),
        Arc::new(store),
        vec![],
    );
    let job = job.with_history_days(7);
    let report = job.run_once(game_day()).await.unwrap();

    assert_eq!(report.date, game_day());
    assert_eq!(report.scheduled_games, 1);
    assert_eq!(report.historical_games, 2);
    assert_eq!(report.odds_games, 1);
    assert_eq!(report.prepared_bets, 4);
    assert!(status_rx.borrow().healthy);
}

#[tokio::test]
async fn test_acquisition_fetch_failure_saves_nothing() {
    let odds = MockOdds::new();
    let mut schedule = MockSchedule::new();
    schedule
        .expect_games_on()
        .returning(|_| Err(anyhow::anyhow!("scoreboard: server error 503")));

    // No expectations: any save would panic
    let store = MockStore::new();

    let (job, _status_rx) = AcquisitionJob::new(
        Arc::new(odds),
        Arc::new(schedule),
        Arc::new(store),
        vec![],
    );
    let err = job.run_once(game_day()).await.unwrap_err();
    assert!(format!("{err:#}").contains("503"));
}

#[tokio::test]
async fn test_acquisition_history_failure_saves_nothing() {
    let (odds, mut schedule) = mock_sources();
    schedule
        .expect_games_between()
        .returning(|_, _| Err(anyhow::anyhow!("leaguegamefinder: server error 500")));

    let (job, status_rx) = AcquisitionJob::new(
        Arc::new(odds),
        Arc::new(schedule),
        Arc::new(MockStore::new()),
        vec![],
    );
    let err = job.run_once(game_day()).await.unwrap_err();
    assert!(format!("{err:#}").contains("recent games"));
    assert_eq!(status_rx.borrow().runs, 0);
}

#[tokio::test]
async fn test_acquisition_loop_stops_on_shutdown() {
    let mut odds = MockOdds::new();
    odds.expect_fetch_odds().returning(|| Ok(vec![heat_at_celtics()]));
    let mut schedule = MockSchedule::new();
    schedule.expect_games_on().returning(|_| Ok(final_schedule()));
    schedule.expect_games_between().returning(|_, _| Ok(recent_games()));
    schedule
        .expect_team_reference()
        .returning(|| Ok(TeamReference::nba()));
    let mut store = MockStore::new();
    store.expect_save_schedule().returning(|_| Ok(()));
    store.expect_save_historical_games().returning(|_| Ok(()));
    store.expect_save_teams().returning(|_| Ok(()));
    store.expect_save_odds().returning(|_| Ok(()));
    store.expect_save_prepared_bets().returning(|_| Ok(()));

    let run_times = vec![chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap()];
    let (job, mut status_rx) = AcquisitionJob::new(
        Arc::new(odds),
        Arc::new(schedule),
        Arc::new(store),
        run_times,
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);
    let handle = tokio::spawn(async move { job.run(shutdown_rx).await });

    // First run happens immediately on start
    status_rx.changed().await.unwrap();
    assert_eq!(status_rx.borrow().runs, 1);
    assert!(status_rx.borrow().healthy);

    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

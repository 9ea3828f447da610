//! Worked Scenarios - Enumeration and Staking End to End
//!
//! Small, hand-checked cases run through the public engine API.

use rust_decimal_macros::dec;

use nba_parlay_engine::domain::{
    BetCandidate, BetSide, BetType, EngineError, ParlayQuery, ParlayStatus, StakingEngine,
    enumerate_parlays,
};
use nba_parlay_engine::usecases::ParlayRecommender;

fn bet(team: &str, price: f64, prob: f64) -> BetCandidate {
    BetCandidate {
        game_id: format!("game-{team}"),
        sport: "basketball_nba".to_string(),
        bookmaker: "FanDuel".to_string(),
        team: team.to_string(),
        bet_side: BetSide::Home,
        bet_type: BetType::H2h,
        price,
        point: 0.0,
        away_team: None,
        travel_distance: 0.0,
        predicted_probability: prob,
    }
}

fn two_legs() -> Vec<BetCandidate> {
    vec![bet("Denver Nuggets", 1.40, 0.60), bet("Phoenix Suns", 1.50, 0.55)]
}

#[test]
fn two_leg_parlay_at_2_10_is_retained() {
    let query = ParlayQuery::default();
    let set = enumerate_parlays(&two_legs(), &query).unwrap();

    // Singles 1.40 and 1.50 miss [1.80, 2.20]; the pair lands at 2.10
    assert_eq!(set.status, ParlayStatus::Found);
    assert_eq!(set.len(), 1);
    let parlay = &set.parlays[0];
    assert_eq!(parlay.leg_indices, vec![0, 1]);
    assert!((parlay.cumulative_odds - 2.10).abs() < 1e-9);
    assert!((parlay.cumulative_probability - 0.33).abs() < 1e-9);
    assert_eq!(parlay.display_odds(), dec!(2.10));
    assert_eq!(parlay.display_probability(), dec!(0.3300));
    assert_eq!(parlay.label(), "Denver Nuggets @ FanDuel, Phoenix Suns @ FanDuel");
}

#[test]
fn flat_stake_of_10_returns_21() {
    let set = enumerate_parlays(&two_legs(), &ParlayQuery::default()).unwrap();
    let staking = StakingEngine::new(10.0, 1000.0).unwrap();
    let rec = staking.recommend(&set.parlays[0]);
    assert_eq!(rec.potential_return, dec!(21.00));
}

#[test]
fn no_edge_means_zero_kelly() {
    // 0.33 < 1 / 2.10 ≈ 0.476
    let set = enumerate_parlays(&two_legs(), &ParlayQuery::default()).unwrap();
    let staking = StakingEngine::new(10.0, 1000.0).unwrap();
    assert_eq!(staking.kelly_stake(&set.parlays[0]), 0.0);

    let rec = staking.recommend(&set.parlays[0]);
    assert_eq!(rec.kelly_stake, dec!(0));
    assert!(!rec.has_edge);
}

#[test]
fn positive_edge_sizes_by_kelly() {
    // p = 0.6 at evens: f* = (0.6 - 0.4) / 1 = 0.2
    let set = enumerate_parlays(&[bet("Utah Jazz", 2.0, 0.6)], &ParlayQuery::default()).unwrap();
    let staking = StakingEngine::new(10.0, 1000.0).unwrap();
    let rec = staking.recommend(&set.parlays[0]);
    assert_eq!(rec.kelly_stake, dec!(200.00));
    assert_eq!(rec.potential_return, dec!(20.00));
    assert!(rec.has_edge);
}

#[test]
fn empty_candidates_is_empty_not_error() {
    let set = enumerate_parlays(&[], &ParlayQuery::default()).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.status, ParlayStatus::NoCandidates);
    assert_eq!(set.examined, 0);
}

#[test]
fn zero_stake_is_invalid_argument() {
    assert!(matches!(StakingEngine::new(0.0, 1000.0), Err(EngineError::InvalidArgument(_))));
    assert!(matches!(StakingEngine::new(10.0, -5.0), Err(EngineError::InvalidArgument(_))));
}

#[test]
fn out_of_range_leg_count_is_invalid_argument() {
    assert!(matches!(ParlayQuery::new(0, 2.0, 0.1), Err(EngineError::InvalidArgument(_))));
    let query = ParlayQuery {
        max_legs: 9,
        ..ParlayQuery::default()
    };
    assert!(matches!(enumerate_parlays(&two_legs(), &query), Err(EngineError::InvalidArgument(_))));
}

#[test]
fn selection_is_capped_at_three_legs() {
    let pool: Vec<BetCandidate> = [
        ("Atlanta Hawks", 1.25),
        ("Chicago Bulls", 1.30),
        ("Orlando Magic", 1.25),
        ("Toronto Raptors", 1.30),
    ]
    .iter()
    .map(|(team, price)| bet(team, *price, 0.8))
    .collect();

    let recommender = ParlayRecommender::from_config(&Default::default(), &Default::default()).unwrap();
    let rec = recommender.recommend(&pool, &[0, 1, 2, 3]).unwrap();

    assert_eq!(rec.selected.len(), 3);
    assert!(rec.selected.iter().all(|c| c.team != "Toronto Raptors"));
    // Only the three-leg combination reaches the band: 1.25 * 1.30 * 1.25 = 2.03125
    assert_eq!(rec.parlays.len(), 1);
    assert_eq!(rec.parlays.parlays[0].leg_count(), 3);
}

//! Bet Candidate Normalizer
//!
//! Flattens the nested odds payload into one `BetCandidate` per
//! (game, bookmaker, market, outcome), keeping only outcomes that name
//! the home or away team, then attaches the visiting team from the
//! schedule and the venue travel distance for head-to-head bets.

use std::collections::HashMap;

use tracing::{debug, info, instrument};

use crate::domain::bet::{BetCandidate, BetSide, BetType};
use crate::domain::error::EngineResult;
use crate::domain::teams::{TeamReference, travel_distance};
use crate::ports::odds_feed::RawGameOdds;
use crate::ports::schedule::ScheduleTable;

/// Normalize a raw odds payload into bet candidates.
///
/// Fails with a configuration error when the schedule has no visitor
/// team column. A game missing from the schedule, or a team missing
/// from the venue table, yields a travel distance of 0.
#[instrument(skip_all, fields(games = raw_odds.len()))]
pub fn normalize(
  raw_odds: &[RawGameOdds],
  schedule: &ScheduleTable,
  teams: &TeamReference,
) -> EngineResult<Vec<BetCandidate>> {
  let away_by_game = away_team_lookup(schedule, teams)?;
  let mut candidates = flatten_odds(raw_odds);

  for candidate in &mut candidates {
    candidate.away_team = away_by_game.get(&candidate.game_id).cloned();
    candidate.travel_distance = if candidate.bet_type == BetType::H2h && !candidate.team.is_empty() {
      travel_distance(&candidate.team, candidate.away_team.as_deref())
    } else {
      0.0
    };
  }

  info!(
    candidates = candidates.len(),
    scheduled = away_by_game.len(),
    "Odds normalized into bet candidates"
  );
  Ok(candidates)
}

/// Flatten the payload in feed order without schedule data.
pub fn flatten_odds(raw_odds: &[RawGameOdds]) -> Vec<BetCandidate> {
  let mut candidates = Vec::new();
  let mut unmatched = 0usize;
  let mut unknown_markets = 0usize;

  for game in raw_odds {
    for bookmaker in &game.bookmakers {
      for market in &bookmaker.markets {
        let Some(bet_type) = BetType::from_market_key(&market.key) else {
          unknown_markets += 1;
          continue;
        };
        for outcome in &market.outcomes {
          let Some(bet_side) = BetSide::resolve(&outcome.name, &game.home_team, &game.away_team) else {
            unmatched += 1;
            continue;
          };
          candidates.push(BetCandidate {
            game_id: game.id.clone(),
            sport: game.sport_key.clone(),
            bookmaker: bookmaker.title.clone(),
            team: outcome.name.clone(),
            bet_side,
            bet_type,
            price: outcome.price,
            point: outcome.point.unwrap_or(0.0),
            away_team: None,
            travel_distance: 0.0,
            predicted_probability: 0.0,
          });
        }
      }
    }
  }

  if unmatched > 0 || unknown_markets > 0 {
    debug!(unmatched, unknown_markets, "Dropped outcomes not backing a team");
  }
  candidates
}

/// Map of schedule game id to the visiting team's full name.
fn away_team_lookup(
  schedule: &ScheduleTable,
  teams: &TeamReference,
) -> EngineResult<HashMap<String, String>> {
  let games = schedule.games()?;
  Ok(
    games
      .into_iter()
      .map(|g| (g.game_id, teams.resolve_name(g.visitor_team_id)))
      .collect(),
  )
}

#[cfg(test)]
pub(crate) mod fixtures {
  use serde_json::json;

  use crate::ports::odds_feed::{RawBookmaker, RawGameOdds, RawMarket, RawOutcome};
  use crate::ports::schedule::{GAME_ID, ScheduleTable, VISITOR_TEAM_ID};

  pub fn outcome(name: &str, price: f64, point: Option<f64>) -> RawOutcome {
    RawOutcome {
      name: name.to_string(),
      price,
      point,
    }
  }

  /// Celtics (home) vs Heat with h2h, spreads and totals from one book.
  pub fn celtics_heat() -> RawGameOdds {
    RawGameOdds {
      id: "g1".to_string(),
      sport_key: "basketball_nba".to_string(),
      commence_time: None,
      home_team: "Boston Celtics".to_string(),
      away_team: "Miami Heat".to_string(),
      bookmakers: vec![RawBookmaker {
        key: "draftkings".to_string(),
        title: "DraftKings".to_string(),
        markets: vec![
          RawMarket {
            key: "h2h".to_string(),
            outcomes: vec![outcome("Boston Celtics", 1.40, None), outcome("Miami Heat", 3.10, None)],
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
            outcomes: vec![outcome("Over", 1.87, Some(215.5)), outcome("Under", 1.95, Some(215.5))],
          },
        ],
      }],
    }
  }

  /// Schedule where game `g1` is visited by the Heat.
  pub fn schedule_g1() -> ScheduleTable {
    ScheduleTable::new(
      vec![GAME_ID.to_string(), VISITOR_TEAM_ID.to_string()],
      vec![vec![json!("g1"), json!(1610612748)]],
    )
  }
}

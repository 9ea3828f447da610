//! Outcome Labeling - Training Rows from Final Scores
//!
//! Marks each normalized bet as won or lost using the schedule's final
//! scores. The rows feed model training, which happens outside this crate.

use std::collections::HashMap;

use tracing::{instrument, warn};

use crate::domain::bet::BetCandidate;
use crate::domain::error::EngineResult;
use crate::domain::teams::TeamReference;
use crate::ports::repository::LabeledBet;
use crate::ports::schedule::{ScheduleTable, ScheduledGame};

/// Price above which the placeholder rule counts a bet as won.
const PLACEHOLDER_PRICE_THRESHOLD: f64 = 1.5;

/// Label candidates with their outcome.
///
/// With both score columns present, a bet wins when its team is the home
/// team and the home score is higher, or the visitor and the visitor score
/// is higher; anything else (unknown team, unscored game) is a loss.
/// Without score columns the placeholder rule `price > 1.5` is used.
#[instrument(skip_all, fields(candidates = candidates.len()))]
pub fn label_outcomes(
  candidates: &[BetCandidate],
  schedule: &ScheduleTable,
  teams: &TeamReference,
) -> EngineResult<Vec<LabeledBet>> {
  if !schedule.has_scores() {
    warn!("Schedule has no score columns, labeling with placeholder price rule");
    return Ok(
      candidates
        .iter()
        .map(|c| LabeledBet {
          candidate: c.clone(),
          winning: u8::from(c.price > PLACEHOLDER_PRICE_THRESHOLD),
        })
        .collect(),
    );
  }

  let games: HashMap<String, ScheduledGame> = schedule
    .games()?
    .into_iter()
    .map(|g| (g.game_id.clone(), g))
    .collect();
  let names = teams.id_to_full_name();

  Ok(
    candidates
      .iter()
      .map(|c| {
        let won = games.get(&c.game_id).is_some_and(|g| {
          let home_score = g.home_score.unwrap_or(0.0);
          let visitor_score = g.visitor_score.unwrap_or(0.0);
          let home_name = g.home_team_id.and_then(|id| names.get(&id).copied());
          let visitor_name = names.get(&g.visitor_team_id).copied();
          if home_name == Some(c.team.as_str()) {
            home_score > visitor_score
          } else if visitor_name == Some(c.team.as_str()) {
            visitor_score > home_score
          } else {
            false
          }
        });
        LabeledBet {
          candidate: c.clone(),
          winning: u8::from(won),
        }
      })
      .collect(),
  )
}

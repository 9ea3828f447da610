//! Probability Annotator
//!
//! Runs the classifier once over the whole candidate batch and writes
//! the positive-class probability into each candidate. Either every
//! candidate is annotated or the call fails; there is no partial result.

use tracing::{debug, instrument};

use crate::domain::bet::{BetCandidate, FeatureVector};
use crate::domain::error::{EngineError, EngineResult};
use crate::ports::model::ProbabilityModel;

/// Attach model probabilities to `candidates`.
#[instrument(skip_all, fields(candidates = candidates.len(), model = model.name()))]
pub fn annotate(
  mut candidates: Vec<BetCandidate>,
  model: &dyn ProbabilityModel,
) -> EngineResult<Vec<BetCandidate>> {
  if candidates.is_empty() {
    return Ok(candidates);
  }

  let rows: Vec<FeatureVector> = candidates.iter().map(BetCandidate::features).collect();
  let probabilities = model
    .predict_proba(&rows)
    .map_err(|e| EngineError::Prediction(format!("{e:#}")))?;

  if probabilities.len() != rows.len() {
    return Err(EngineError::Prediction(format!(
      "model returned {} probabilities for {} rows",
      probabilities.len(),
      rows.len()
    )));
  }
  if let Some((i, p)) = probabilities
    .iter()
    .enumerate()
    .find(|(_, p)| !(0.0..=1.0).contains(*p))
  {
    return Err(EngineError::Prediction(format!(
      "probability {p} for row {i} is outside [0, 1]"
    )));
  }

  for (candidate, p) in candidates.iter_mut().zip(probabilities) {
    candidate.predicted_probability = p;
  }

  debug!("Candidates annotated");
  Ok(candidates)
}

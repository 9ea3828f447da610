//! Model Port - Binary Classifier Interface
//!
//! The engine only needs one operation from a trained model: the
//! positive-class probability for each feature row.

use crate::domain::bet::FeatureVector;

/// Trained binary classifier.
///
/// Inference is synchronous and in-process; implementations must return
/// exactly one probability in [0, 1] per input row, in input order.
pub trait ProbabilityModel: Send + Sync {
  /// Positive-class probability for each row.
  fn predict_proba(&self, rows: &[FeatureVector]) -> anyhow::Result<Vec<f64>>;

  /// Short identifier for logs.
  fn name(&self) -> &str {
    "model"
  }
}

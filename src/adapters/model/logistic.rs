//! Logistic regression classifier loaded from JSON.
//!
//! File format:
//! ```json
//! { "weights": [w_price_log, w_point, w_travel_distance, w_is_home], "intercept": b }
//! ```
//! `p = 1 / (1 + exp(-(w . x + b)))`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::bet::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
use crate::ports::model::ProbabilityModel;

/// Fitted logistic regression over the four candidate features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: [f64; FEATURE_COUNT],
    pub intercept: f64,
}

impl LogisticModel {
    pub fn new(weights: [f64; FEATURE_COUNT], intercept: f64) -> Result<Self> {
        anyhow::ensure!(
            weights.iter().all(|w| w.is_finite()) && intercept.is_finite(),
            "Model coefficients must be finite"
        );
        Ok(Self { weights, intercept })
    }

    /// Load coefficients from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;
        let raw: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse model file: {}", path.display()))?;
        let model = Self::new(raw.weights, raw.intercept)?;

        info!(
            path = %path.display(),
            features = ?FEATURE_NAMES,
            intercept = model.intercept,
            "Model loaded"
        );
        Ok(model)
    }

    /// Write coefficients as pretty JSON, via a `.tmp` sibling and rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create model directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize model")?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to rename {}", tmp_path.display()))?;

        info!(path = %path.display(), intercept = self.intercept, "Model saved");
        Ok(())
    }

    fn probability(&self, row: &FeatureVector) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(row.0.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        sigmoid(z)
    }
}

/// `1 / (1 + exp(-z))`.
pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ProbabilityModel for LogisticModel {
    fn predict_proba(&self, rows: &[FeatureVector]) -> Result<Vec<f64>> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                anyhow::ensure!(
                    row.0.iter().all(|x| x.is_finite()),
                    "Non-finite feature in row {i}"
                );
                Ok(self.probability(row))
            })
            .collect()
    }

    fn name(&self) -> &str {
        "logistic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_zero_model_is_coin_flip() {
        let model = LogisticModel::new([0.0; FEATURE_COUNT], 0.0).unwrap();
        let probs = model
            .predict_proba(&[FeatureVector([1.0, -7.5, 200.0, 1.0])])
            .unwrap();
        assert!((probs[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_longer_price_lowers_probability() {
        // Negative weight on log price: favourites score higher
        let model = LogisticModel::new([-2.0, 0.0, 0.0, 0.0], 1.0).unwrap();
        let favourite = FeatureVector([1.4_f64.ln(), 0.0, 0.0, 1.0]);
        let underdog = FeatureVector([3.1_f64.ln(), 0.0, 0.0, 1.0]);
        let probs = model.predict_proba(&[favourite, underdog]).unwrap();
        assert!(probs[0] > probs[1]);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_non_finite_feature_is_error() {
        let model = LogisticModel::new([0.1; FEATURE_COUNT], 0.0).unwrap();
        assert!(model.predict_proba(&[FeatureVector([f64::NAN, 0.0, 0.0, 0.0])]).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"weights": [-0.8, 0.01, -0.0002, 0.1], "intercept": 0.4}}"#).unwrap();
        let model = LogisticModel::load(file.path()).unwrap();
        assert_eq!(model.weights[0], -0.8);
        assert_eq!(model.intercept, 0.4);
        assert_eq!(model.name(), "logistic");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("fitted.json");
        let model = LogisticModel::new([-1.1, 0.02, -0.0001, 0.3], 0.25).unwrap();
        model.save(&path).unwrap();

        assert_eq!(LogisticModel::load(&path).unwrap(), model);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_rejects_wrong_arity() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"weights": [1.0, 2.0], "intercept": 0.0}}"#).unwrap();
        assert!(LogisticModel::load(file.path()).is_err());
        assert!(LogisticModel::load("missing-model.json").is_err());
    }
}

//! Logistic model fitting from labeled training rows.
//!
//! Rows are shuffled with a seeded RNG and split into train and holdout
//! sets. Features are standardized on the training rows and fitted by
//! full-batch gradient descent on the log loss; the coefficients are
//! then folded back so the saved model takes raw features.

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::TrainingConfig;
use crate::domain::bet::{FEATURE_COUNT, FeatureVector};
use crate::ports::model::ProbabilityModel;
use crate::ports::repository::LabeledBet;

use super::logistic::{LogisticModel, sigmoid};

/// Holdout evaluation of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    /// Share of holdout rows classified correctly at p >= 0.5.
    pub accuracy: f64,
    /// `None` when the holdout has a single class.
    pub roc_auc: Option<f64>,
}

type Sample = (FeatureVector, bool);

/// Fits a `LogisticModel` with the configured split and descent settings.
#[derive(Debug, Clone)]
pub struct LogisticTrainer {
    config: TrainingConfig,
}

impl LogisticTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Split, fit and evaluate.
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn train(&self, rows: &[LabeledBet]) -> Result<(LogisticModel, TrainingReport)> {
        anyhow::ensure!(rows.len() >= 2, "Need at least 2 training rows, got {}", rows.len());

        let samples: Vec<Sample> = rows
            .iter()
            .map(|r| (r.candidate.features(), r.winning > 0))
            .collect();
        let (train, test) = split(samples, self.config.test_fraction, self.config.seed);

        let wins = train.iter().filter(|(_, y)| *y).count();
        anyhow::ensure!(
            wins > 0 && wins < train.len(),
            "Training rows hold a single class ({wins} wins of {})",
            train.len()
        );

        let model = fit(&train, &self.config)?;
        let report = evaluate(&model, &train, &test)?;

        info!(
            train_rows = report.train_rows,
            test_rows = report.test_rows,
            accuracy = report.accuracy,
            roc_auc = ?report.roc_auc,
            "Model trained"
        );
        Ok((model, report))
    }
}

/// Seeded shuffle, then hold out `ceil(len * fraction)` rows (at least one
/// row on each side).
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn split(mut samples: Vec<Sample>, fraction: f64, seed: u64) -> (Vec<Sample>, Vec<Sample>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let test_len = ((samples.len() as f64) * fraction).ceil() as usize;
    let test_len = test_len.clamp(1, samples.len().saturating_sub(1));
    let train = samples.split_off(test_len);
    (train, samples)
}

#[allow(clippy::cast_precision_loss)]
fn fit(train: &[Sample], config: &TrainingConfig) -> Result<LogisticModel> {
    let n = train.len() as f64;

    let mut mean = [0.0; FEATURE_COUNT];
    let mut scale = [1.0; FEATURE_COUNT];
    for j in 0..FEATURE_COUNT {
        mean[j] = train.iter().map(|(FeatureVector(x), _)| x[j]).sum::<f64>() / n;
        let var = train
            .iter()
            .map(|(FeatureVector(x), _)| (x[j] - mean[j]).powi(2))
            .sum::<f64>()
            / n;
        // Constant columns stay at zero after centering
        if var.sqrt() > 1e-12 {
            scale[j] = var.sqrt();
        }
    }

    let standardized: Vec<([f64; FEATURE_COUNT], f64)> = train
        .iter()
        .map(|(FeatureVector(x), y)| {
            (
                std::array::from_fn(|j| (x[j] - mean[j]) / scale[j]),
                if *y { 1.0 } else { 0.0 },
            )
        })
        .collect();

    let mut w = [0.0; FEATURE_COUNT];
    let mut b = 0.0;
    for _ in 0..config.epochs {
        let mut grad_w = [0.0; FEATURE_COUNT];
        let mut grad_b = 0.0;
        for (x, y) in &standardized {
            let z = w.iter().zip(x).map(|(wj, xj)| wj * xj).sum::<f64>() + b;
            let err = sigmoid(z) - y;
            for (g, xj) in grad_w.iter_mut().zip(x) {
                *g += err * xj;
            }
            grad_b += err;
        }
        for (wj, g) in w.iter_mut().zip(grad_w) {
            *wj -= config.learning_rate * (g / n + config.l2 * *wj);
        }
        b -= config.learning_rate * grad_b / n;
    }

    let weights: [f64; FEATURE_COUNT] = std::array::from_fn(|j| w[j] / scale[j]);
    let intercept = b - (0..FEATURE_COUNT).map(|j| w[j] * mean[j] / scale[j]).sum::<f64>();
    LogisticModel::new(weights, intercept)
}

#[allow(clippy::cast_precision_loss)]
fn evaluate(model: &LogisticModel, train: &[Sample], test: &[Sample]) -> Result<TrainingReport> {
    let features: Vec<FeatureVector> = test.iter().map(|(x, _)| *x).collect();
    let labels: Vec<bool> = test.iter().map(|(_, y)| *y).collect();
    let probs = model.predict_proba(&features)?;

    let correct = probs
        .iter()
        .zip(&labels)
        .filter(|(p, y)| (**p >= 0.5) == **y)
        .count();

    Ok(TrainingReport {
        train_rows: train.len(),
        test_rows: test.len(),
        accuracy: correct as f64 / test.len() as f64,
        roc_auc: roc_auc(&probs, &labels),
    })
}

/// Area under the ROC curve via the rank-sum statistic, ties averaged.
#[allow(clippy::cast_precision_loss)]
pub fn roc_auc(scores: &[f64], positive: &[bool]) -> Option<f64> {
    let positives = positive.iter().filter(|y| **y).count();
    let negatives = positive.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]].total_cmp(&scores[order[i]]).is_eq() {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        rank_sum += avg_rank * order[i..=j].iter().filter(|&&k| positive[k]).count() as f64;
        i = j + 1;
    }

    let p = positives as f64;
    Some((rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bet::fixtures::candidate;

    /// Favourites (1.20..1.59) win, underdogs (2.50..3.28) lose.
    fn separable_rows() -> Vec<LabeledBet> {
        (0..40)
            .flat_map(|i| {
                let i = f64::from(i);
                [
                    LabeledBet { candidate: candidate("Boston Celtics", 1.2 + 0.01 * i, 0.0), winning: 1 },
                    LabeledBet { candidate: candidate("Miami Heat", 2.5 + 0.02 * i, 0.0), winning: 0 },
                ]
            })
            .collect()
    }

    #[test]
    fn test_fit_ranks_separable_rows() {
        let (model, report) = LogisticTrainer::new(TrainingConfig::default())
            .train(&separable_rows())
            .unwrap();

        assert_eq!(report.test_rows, 16);
        assert_eq!(report.train_rows, 64);
        assert_eq!(report.roc_auc, Some(1.0));
        assert!(report.accuracy >= 0.9, "accuracy {}", report.accuracy);

        // Shorter price, higher probability
        assert!(model.weights[0] < 0.0);
        let probs = model
            .predict_proba(&[
                candidate("Boston Celtics", 1.3, 0.0).features(),
                candidate("Miami Heat", 3.0, 0.0).features(),
            ])
            .unwrap();
        assert!(probs[0] > 0.5 && probs[1] < 0.5, "{probs:?}");
    }

    #[test]
    fn test_same_seed_same_model() {
        let trainer = LogisticTrainer::new(TrainingConfig {
            epochs: 200,
            ..TrainingConfig::default()
        });
        let first = trainer.train(&separable_rows()).unwrap();
        let second = trainer.train(&separable_rows()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_class_is_error() {
        let rows: Vec<LabeledBet> = (0..10)
            .map(|_| LabeledBet { candidate: candidate("Utah Jazz", 2.0, 0.0), winning: 0 })
            .collect();
        let err = LogisticTrainer::new(TrainingConfig::default()).train(&rows).unwrap_err();
        assert!(err.to_string().contains("single class"));
        assert!(LogisticTrainer::new(TrainingConfig::default()).train(&rows[..1]).is_err());
    }

    #[test]
    fn test_roc_auc() {
        assert_eq!(roc_auc(&[0.1, 0.4, 0.35, 0.8], &[false, false, true, true]), Some(0.75));
        assert_eq!(roc_auc(&[0.9, 0.1], &[false, true]), Some(0.0));
        assert_eq!(roc_auc(&[0.5, 0.5], &[true, false]), Some(0.5));
        assert_eq!(roc_auc(&[0.2, 0.7], &[true, true]), None);
    }
}

//! Model Adapters
//!
//! Concrete `ProbabilityModel` implementations and their fitting.

pub mod logistic;
pub mod training;

pub use logistic::LogisticModel;
pub use training::{LogisticTrainer, TrainingReport};

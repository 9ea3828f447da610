//! Engine error taxonomy.
//!
//! Every failure the engine can report to its caller. An empty result
//! (no candidates, no parlays in the odds band) is not an error and is
//! reported through `ParlayStatus` instead.

use thiserror::Error;

/// Failure raised by the parlay engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Schedule or odds data does not have the expected schema.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The probability model failed during inference.
    #[error("prediction error: {0}")]
    Prediction(String),

    /// Caller passed a value outside the operation's contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result alias used across the domain and use-case layers.
pub type EngineResult<T> = Result<T, EngineError>;

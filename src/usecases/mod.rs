//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! engine's workflows. Each use case is a self-contained operation.
//!
//! Use cases:
//! - `normalizer`: Raw odds → bet candidates with travel distance
//! - `annotator`: Model probabilities onto candidates
//! - `labeling`: Won/lost training rows from final scores
//! - `selection`: User-picked legs, capped
//! - `recommender`: The full flow, ending in parlays and stake sizes
//! - `acquisition`: Scheduled fetch-and-save job

pub mod acquisition;
pub mod annotator;
pub mod labeling;
pub mod normalizer;
pub mod recommender;
pub mod selection;

pub use recommender::{MarketInputs, ParlayRecommender, Recommendation};

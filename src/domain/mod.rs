//! Domain layer - Core parlay engine.
//!
//! Pure data transformations over in-memory values: team reference data,
//! bet candidates, parlay enumeration and stake sizing.
//! No I/O here (hexagonal architecture inner ring).

pub mod bet;
pub mod error;
pub mod parlay;
pub mod staking;
pub mod teams;

// Re-export core types for convenience
pub use bet::{BetCandidate, BetSide, BetType, FeatureVector};
pub use error::{EngineError, EngineResult};
pub use parlay::{Parlay, ParlayQuery, ParlaySet, ParlayStatus, enumerate_parlays};
pub use staking::{StakeRecommendation, StakingEngine, kelly_fraction};
pub use teams::{TeamInfo, TeamLocation, TeamReference, travel_distance};

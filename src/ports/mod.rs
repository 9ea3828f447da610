//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the engine's use cases require
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `OddsFeed`: Live bookmaker odds payload
//! - `ScheduleSource`: Today's schedule table and team reference
//! - `ProbabilityModel`: Trained binary classifier
//! - `SnapshotRepository`: Snapshots written by the acquisition job

pub mod model;
pub mod odds_feed;
pub mod repository;
pub mod schedule;

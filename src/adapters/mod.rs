//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, model files, file I/O).
//!
//! Adapter categories:
//! - `api`: The Odds API and NBA stats HTTP clients
//! - `model`: logistic regression classifier loaded from JSON
//! - `metrics`: Prometheus metrics export and health checks
//! - `persistence`: JSON snapshot files

pub mod api;
pub mod metrics;
pub mod model;
pub mod persistence;

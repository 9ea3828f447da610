//! HTTP API Adapters
//!
//! Clients for the external data collaborators:
//! - `odds_api`: The Odds API v4 live odds (`OddsFeed`)
//! - `nba_stats`: NBA stats scoreboard (`ScheduleSource`)
//! - `client`: shared rate-limited, retrying HTTP client

pub mod client;
pub mod nba_stats;
pub mod odds_api;

pub use client::{HttpClient, HttpClientConfig};
pub use nba_stats::NbaStatsClient;
pub use odds_api::OddsApiClient;

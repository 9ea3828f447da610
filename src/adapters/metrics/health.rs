//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live and /ready endpoints via axum 0.7 for the acquisition
//! daemon. Readiness follows the status published by the job: ready
//! while the most recent run succeeded.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::sync::{broadcast, watch};
use tracing::{info, instrument};

use crate::usecases::acquisition::JobStatus;

/// Shared health state polled by readiness probes.
#[derive(Debug, Clone)]
pub struct HealthState {
    status_rx: watch::Receiver<JobStatus>,
}

impl HealthState {
    pub fn new(status_rx: watch::Receiver<JobStatus>) -> Self {
        Self { status_rx }
    }

    /// Ready while the last acquisition run succeeded.
    pub fn is_ready(&self) -> bool {
        self.status_rx.borrow().healthy
    }
}

/// Axum-based health check HTTP server.
pub struct HealthServer {
    state: Arc<HealthState>,
    /// Bind port (default 8080 from config).
    port: u16,
}

impl HealthServer {
    pub fn new(state: Arc<HealthState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Serve until shutdown.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .with_state(Arc::clone(&self.state));

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
        if state.is_ready() {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_follows_job_status() {
        let (tx, rx) = watch::channel(JobStatus {
            healthy: true,
            ..JobStatus::default()
        });
        let state = HealthState::new(rx);
        assert!(state.is_ready());

        tx.send_modify(|s| {
            s.runs += 1;
            s.failures += 1;
            s.healthy = false;
        });
        assert!(!state.is_ready());
    }
}

//! Prometheus Metrics Registry - Acquisition Observability
//!
//! Registers and exposes Prometheus metrics for the acquisition daemon.
//! Covers run counts, failures, dataset sizes and job health.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use prometheus::{Encoder, Gauge, GaugeVec, IntCounter, Opts, Registry, TextEncoder};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::usecases::acquisition::JobStatus;

/// Centralized Prometheus metrics for the acquisition job.
///
/// All metrics follow the naming convention `nba_parlay_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Total acquisition runs.
    pub runs_total: IntCounter,
    /// Total failed acquisition runs.
    pub failures_total: IntCounter,
    /// Size of the last saved datasets, by dataset.
    pub dataset_rows: GaugeVec,
    /// Whether the last run succeeded (1 = yes).
    pub healthy: Gauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let runs_total = IntCounter::new("nba_parlay_acquisition_runs_total", "Total acquisition runs")?;

        let failures_total = IntCounter::new(
            "nba_parlay_acquisition_failures_total",
            "Total failed acquisition runs",
        )?;

        let dataset_rows = GaugeVec::new(
            Opts::new(
                "nba_parlay_dataset_rows",
                "Rows in the last saved snapshot",
            ),
            &["dataset"],
        )?;

        let healthy = Gauge::new(
            "nba_parlay_acquisition_healthy",
            "Whether the last acquisition run succeeded (1=yes, 0=no)",
        )?;

        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;
        registry.register(Box::new(dataset_rows.clone()))?;
        registry.register(Box::new(healthy.clone()))?;

        Ok(Self {
            registry,
            runs_total,
            failures_total,
            dataset_rows,
            healthy,
        })
    }

    /// Bring the metrics in line with a published job status.
    #[allow(clippy::cast_precision_loss)]
    pub fn update(&self, status: &JobStatus) {
        // Counters only move forward; add the difference
        let runs = status.runs.saturating_sub(self.runs_total.get());
        self.runs_total.inc_by(runs);
        let failures = status.failures.saturating_sub(self.failures_total.get());
        self.failures_total.inc_by(failures);

        self.healthy.set(if status.healthy { 1.0 } else { 0.0 });

        if let Some(report) = &status.last_report {
            for (dataset, rows) in [
                ("schedule", report.scheduled_games),
                ("historical_games", report.historical_games),
                ("odds", report.odds_games),
                ("prepared_bets", report.prepared_bets),
            ] {
                self.dataset_rows.with_label_values(&[dataset]).set(rows as f64);
            }
        }
    }

    /// Follow job status updates until the channel closes.
    pub async fn track(self: Arc<Self>, mut status_rx: watch::Receiver<JobStatus>) {
        self.update(&status_rx.borrow_and_update());
        while status_rx.changed().await.is_ok() {
            let status = status_rx.borrow_and_update().clone();
            debug!(runs = status.runs, failures = status.failures, "Metrics updated");
            self.update(&status);
        }
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    match metrics.render() {
                        Ok(body) => (StatusCode::OK, body),
                        Err(e) => {
                            warn!(error = %e, "Failed to encode metrics");
                            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                        }
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

//! HTTP Client - Rate-limited REST Client with Retries
//!
//! Wraps reqwest with a client-side request quota and exponential
//! backoff on 429/5xx. Shared by the odds and schedule adapters.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
  /// Request timeout.
  pub timeout: Duration,
  /// Client-side quota.
  pub requests_per_minute: u32,
  /// Maximum retries on transient errors.
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  pub retry_base_delay: Duration,
  /// Headers sent with every request.
  pub default_headers: HeaderMap,
}

impl Default for HttpClientConfig {
  fn default() -> Self {
    Self {
      timeout: Duration::from_secs(30),
      requests_per_minute: 30,
      max_retries: 3,
      retry_base_delay: Duration::from_millis(500),
      default_headers: HeaderMap::new(),
    }
  }
}

/// Rate-limited HTTP client.
pub struct HttpClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: HttpClientConfig,
  /// Request quota.
  limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpClient {
  /// Create a new client.
  pub fn new(config: HttpClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .default_headers(config.default_headers.clone())
      .pool_max_idle_per_host(2)
      .build()
      .context("Failed to build HTTP client")?;

    let rpm = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
    let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rpm)));

    Ok(Self {
      http,
      config,
      limiter,
    })
  }

  /// GET `url` with query parameters, retrying transient failures.
  ///
  /// `label` names the endpoint in logs; query values may carry secrets
  /// and are never logged.
  pub async fn get(&self, url: &str, query: &[(&str, &str)], label: &str) -> Result<Response> {
    let mut last_error = None;

    for attempt in 0..=self.config.max_retries {
      if attempt > 0 {
        let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
        debug!(endpoint = label, attempt, delay_ms = delay.as_millis(), "Retrying request");
        sleep(delay).await;
      }

      self.limiter.until_ready().await;

      match self.http.get(url).query(query).send().await {
        Ok(response) => match response.status() {
          StatusCode::OK => return Ok(response),
          StatusCode::TOO_MANY_REQUESTS => {
            warn!(endpoint = label, "Rate limited, backing off");
            sleep(Duration::from_secs(2)).await;
            last_error = Some(anyhow::anyhow!("{label}: rate limited"));
          }
          status if status.is_server_error() => {
            warn!(endpoint = label, status = %status, "Server error, retrying");
            last_error = Some(anyhow::anyhow!("{label}: server error {status}"));
          }
          status => {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("{label}: API error {status}: {body}"));
          }
        },
        Err(e) => {
          // The URL carries the API key
          let e = e.without_url();
          warn!(endpoint = label, error = %e, attempt, "Request failed");
          last_error = Some(anyhow::Error::new(e).context(format!("{label}: request failed")));
        }
      }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("{label}: max retries exceeded")))
  }
}

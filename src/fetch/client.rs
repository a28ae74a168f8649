//! Rate-limited, retrying fetch client.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crate::error::{FetchError, TransientError};
use crate::fetch::{FetchMetrics, HttpTransport, RateLimiter, Transport};

// == Fetch Config ==
/// Construction parameters for a `FetchClient`.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Minimum spacing between outbound requests
    pub min_interval: Duration,
    /// Timeout applied to every HTTP call
    pub timeout: Duration,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Base backoff delay, doubled per retry
    pub retry_delay: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            user_agent: concat!("wiki_stats/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

enum StatusClass {
    Success,
    NotFound,
    Retryable,
    Rejected,
}

fn classify(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        404 | 410 => StatusClass::NotFound,
        408 | 429 | 500..=599 => StatusClass::Retryable,
        _ => StatusClass::Rejected,
    }
}

// == Fetch Client ==
/// Paces, retries and meters GET requests over a `Transport`.
pub struct FetchClient {
    transport: Arc<dyn Transport>,
    limiter: RateLimiter,
    metrics: Mutex<FetchMetrics>,
    config: FetchConfig,
}

impl FetchClient {
    /// Creates a client backed by reqwest.
    pub fn new(config: FetchConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(config.timeout, config.user_agent.clone()));
        Self::with_transport(config, transport)
    }

    /// Creates a client over an arbitrary transport.
    pub fn with_transport(config: FetchConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            limiter: RateLimiter::new(config.min_interval),
            metrics: Mutex::new(FetchMetrics::new()),
            config,
        }
    }

    // == Fetch ==
    /// Fetches `url`, retrying transient failures with exponential backoff.
    ///
    /// Not-found and other non-retryable statuses return after one attempt.
    /// Metrics are updated once for the whole sequence.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let start = Instant::now();
        let (outcome, retries) = self.fetch_with_retry(url).await;
        let latency = start.elapsed();

        let mut metrics = self.metrics.lock();
        match &outcome {
            Ok(body) => {
                debug!(bytes = body.len(), latency_ms = latency.as_millis() as u64, "Fetched");
                metrics.record_success(latency, retries);
            }
            Err(_) => metrics.record_failure(latency, retries),
        }

        outcome
    }

    async fn fetch_with_retry(&self, url: &str) -> (Result<Vec<u8>, FetchError>, u32) {
        let mut attempt: u32 = 0;

        loop {
            self.limiter.acquire().await;

            let last = match self.transport.get(url).await {
                Ok(response) => match classify(response.status) {
                    StatusClass::Success => return (Ok(response.body), attempt),
                    StatusClass::NotFound => {
                        let err = FetchError::NotFound {
                            url: url.to_string(),
                        };
                        return (Err(err), attempt);
                    }
                    StatusClass::Rejected => {
                        let err = FetchError::Rejected {
                            url: url.to_string(),
                            status: response.status,
                        };
                        return (Err(err), attempt);
                    }
                    StatusClass::Retryable => TransientError::Status(response.status),
                },
                Err(e) => e,
            };

            if attempt >= self.config.max_retries {
                warn!(url, attempts = attempt + 1, error = %last, "Giving up on fetch");
                let err = FetchError::Exhausted {
                    url: url.to_string(),
                    attempts: attempt + 1,
                    last,
                };
                return (Err(err), attempt);
            }

            let delay = self.backoff_delay(attempt);
            warn!(
                url,
                attempt = attempt + 1,
                error = %last,
                delay_ms = delay.as_millis() as u64,
                "Transient fetch failure, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    // == Backoff ==
    /// Delay before retry number `attempt + 1`: `retry_delay * 2^attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.config
            .retry_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    // == Metrics ==
    /// Snapshot of the process-lifetime counters.
    pub fn metrics(&self) -> FetchMetrics {
        self.metrics.lock().clone()
    }

    pub(crate) fn record_cache_lookup(&self, hit: bool) {
        let mut metrics = self.metrics.lock();
        if hit {
            metrics.record_cache_hit();
        } else {
            metrics.record_cache_miss();
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    // == Close ==
    /// Releases the transport session. Call on shutdown.
    pub async fn close(&self) {
        self.transport.close().await;
    }
}

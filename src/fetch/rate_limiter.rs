//! Request pacing.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

// == Rate Limiter ==
/// Enforces a minimum interval between outbound requests.
///
/// One pacer per client, not per URL. The lock is held across the pacing
/// sleep so concurrent callers queue up instead of all observing an elapsed
/// interval and dispatching together.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Waits until a request may be dispatched and stamps the dispatch time.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Pacing outbound request");
                tokio::time::sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

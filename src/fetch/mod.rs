//! Fetch Module
//!
//! Rate-limited page fetching with bounded exponential-backoff retries.

mod client;
mod metrics;
mod rate_limiter;
mod transport;

// Re-export public types
pub use client::{FetchClient, FetchConfig};
pub use metrics::FetchMetrics;
pub use rate_limiter::RateLimiter;
pub use transport::{HttpTransport, Transport, TransportResponse};

#[cfg(test)]
pub(crate) use client::tests::{fast_config, ScriptedTransport};

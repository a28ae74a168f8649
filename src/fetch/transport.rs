//! HTTP transport seam.
//!
//! `FetchClient` drives retries and pacing over a `Transport`; the reqwest
//! backed `HttpTransport` is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransientError;

/// Status and body of one HTTP attempt.
///
/// The body is only read for 2xx responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// One GET per call, no retries or pacing of its own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a single GET. Any HTTP status is `Ok`; only failures to get a
    /// response at all are errors.
    async fn get(&self, url: &str) -> Result<TransportResponse, TransientError>;

    /// Releases the underlying session. A later `get` may reopen it.
    async fn close(&self);
}

// == HTTP Transport ==
/// reqwest transport with a lazily created, releasable session.
#[derive(Debug)]
pub struct HttpTransport {
    session: Mutex<Option<reqwest::Client>>,
    timeout: Duration,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            session: Mutex::new(None),
            timeout,
            user_agent: user_agent.into(),
        }
    }

    /// Whether a session is currently held.
    pub fn is_open(&self) -> bool {
        self.session.lock().is_some()
    }

    fn session(&self) -> Result<reqwest::Client, TransientError> {
        let mut guard = self.session.lock();
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| TransientError::Connect(format!("failed to create HTTP client: {}", e)))?;
        debug!(timeout_secs = self.timeout.as_secs(), "HTTP session opened");

        *guard = Some(client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransientError> {
        let client = self.session()?;

        let response = client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Ok(TransportResponse::new(status.as_u16(), Vec::new()));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransientError::Timeout
            } else {
                TransientError::Body(e.to_string())
            }
        })?;

        Ok(TransportResponse::new(status.as_u16(), body.to_vec()))
    }

    async fn close(&self) {
        if self.session.lock().take().is_some() {
            debug!("HTTP session closed");
        }
    }
}

fn request_error(e: reqwest::Error) -> TransientError {
    if e.is_timeout() {
        TransientError::Timeout
    } else {
        TransientError::Connect(e.to_string())
    }
}

//! Bounded retries for calls to remote services.
//!
//! Only transient failures (transport errors, timeouts, HTTP 429/5xx) are
//! retried, and only `max_retries` times.

use std::future::Future;
use std::time::Duration;

use leadbot_types::{AgentError, Result};
use log::warn;
use reqwest::StatusCode;

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

pub async fn with_retry<T, F, Fut>(what: &str, max_retries: u32, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                warn!("{} failed ({}), retry {}/{}", what, e, attempt, max_retries);
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Transport-level failure from reqwest.
pub fn transport_error(e: reqwest::Error, timeout_secs: u64) -> AgentError {
    if e.is_timeout() {
        AgentError::Timeout(timeout_secs.saturating_mul(1000))
    } else {
        AgentError::Network(e.to_string())
    }
}

/// Rate limiting and server errors are worth another attempt.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AgentError::Config(format!("HTTP client: {}", e)))
}

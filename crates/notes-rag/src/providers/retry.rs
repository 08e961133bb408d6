//! Bounded retry with exponential backoff for collaborator calls
//!
//! Only failures classified as [`RetryError::Retryable`] are attempted again.
//! Anything else, including plain [`Error`]s lifted with `?`, ends the loop
//! on the first attempt.

use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{Error, Result};

/// Delay before the first retry; doubles on each further attempt
const BASE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound accepted for any `max_retries` setting
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// A failed attempt, classified by whether trying again can help
#[derive(Debug)]
pub enum RetryError {
    /// Timeouts, refused connections, rate limiting, server-side faults
    Retryable(Error),
    /// Rejected requests, bad credentials, unparseable responses
    Fatal(Error),
}

/// Result of a single attempt
pub type Attempt<T> = std::result::Result<T, RetryError>;

impl RetryError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, error: Error) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Self::Retryable(error)
        } else {
            Self::Fatal(error)
        }
    }

    /// Classify a request that never produced a response
    pub fn from_transport(source: &reqwest::Error, error: Error) -> Self {
        if source.is_timeout() || source.is_connect() {
            Self::Retryable(error)
        } else {
            Self::Fatal(error)
        }
    }

    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    /// The underlying pipeline error
    pub fn into_inner(self) -> Error {
        match self {
            Self::Retryable(e) | Self::Fatal(e) => e,
        }
    }
}

impl From<Error> for RetryError {
    fn from(error: Error) -> Self {
        Self::Fatal(error)
    }
}

fn backoff(attempt: u32) -> Duration {
    BASE_DELAY.saturating_mul(2u32.saturating_pow(attempt))
}

/// Run `operation` up to `max_retries + 1` times, returning the last error
pub async fn retry_request<F, Fut, T>(label: &str, max_retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                let delay = backoff(attempt);
                tracing::warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    label,
                    attempt + 1,
                    max_retries + 1,
                    delay,
                    e.into_inner()
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e.into_inner()),
        }
    }
}

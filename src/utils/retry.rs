use std::future::Future;
use std::io::ErrorKind;
use std::time::Duration;

use anyhow::Error;
use async_openai::error::OpenAIError;
use teloxide::{DownloadError, RequestError};

use crate::config::Config;

/// Bounded retry with exponential backoff for transient failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_retries, config.retry_base_delay())
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or the
    /// retries are used up. The last error is returned.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && is_transient(&err) => {
                    let delay = self.delay_for(attempt);
                    attempt += 1;
                    warn!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        what, err, attempt, self.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1 << attempt.min(16))
    }
}

/// Whether `err` is worth another attempt: connection-level failures and
/// Telegram flood control, never API rejections.
pub(crate) fn is_transient(err: &Error) -> bool {
    err.chain().any(|cause| {
        if let Some(err) = cause.downcast_ref::<OpenAIError>() {
            return matches!(err, OpenAIError::Reqwest(_));
        }
        if let Some(err) = cause.downcast_ref::<RequestError>() {
            return matches!(
                err,
                RequestError::Network(_) | RequestError::RetryAfter(_) | RequestError::Io(_)
            );
        }
        if let Some(err) = cause.downcast_ref::<DownloadError>() {
            return matches!(err, DownloadError::Network(_) | DownloadError::Io(_));
        }
        if let Some(err) = cause.downcast_ref::<std::io::Error>() {
            return matches!(
                err.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::TimedOut
                    | ErrorKind::Interrupted
            );
        }
        false
    })
}

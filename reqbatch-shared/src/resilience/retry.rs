//! Bounded fixed-interval retry.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::config::RetryConfig;

/// Retry settings: total attempts (at least one) and the wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    interval: Duration,
}

/// Final result of a retried operation and how many attempts it took
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least 1
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// A single attempt, no retry
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `operation` until it succeeds, fails with an error `should_retry`
    /// rejects, or the attempt budget is spent.
    pub async fn execute<T, E, F, Fut, P>(
        &self,
        mut operation: F,
        should_retry: P,
    ) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        attempts: attempt,
                    }
                }
                Err(error) if attempt < self.max_attempts && should_retry(&error) => {
                    debug!(
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        wait_ms = self.interval.as_millis() as u64,
                        error = %error,
                        "Retryable failure, waiting before next attempt"
                    );
                    if !self.interval.is_zero() {
                        tokio::time::sleep(self.interval).await;
                    }
                    attempt += 1;
                }
                Err(error) => {
                    return RetryOutcome {
                        result: Err(error),
                        attempts: attempt,
                    }
                }
            }
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.interval())
    }
}

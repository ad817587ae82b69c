//! Bounded retry for operations that can report "not ready yet".
//!
//! Each attempt reports readiness through `RetryOutcome` rather than a bare
//! boolean, so a hard failure of the operation aborts the loop immediately
//! while a pending result schedules another attempt. Delays grow linearly
//! from `base_delay` by `increment` up to `max_delay`; the overall budget is
//! `timeout`, checked before sleeping so the policy never oversleeps the
//! deadline.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Outcome of a single attempt.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// The operation produced its result; stop retrying.
    Done(T),
    /// Not ready yet; try again after the current delay.
    Retry,
}

/// Why the retry loop gave up.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The next attempt would land past the deadline.
    #[error("operation did not complete within {0:?}")]
    Timeout(Duration),

    /// The operation failed outright.
    #[error("operation failed: {0}")]
    Operation(E),
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    base_delay: Duration,
    increment: Duration,
    max_delay: Duration,
    timeout: Duration,
}

impl RetryPolicy {
    pub fn new(
        base_delay: Duration,
        increment: Duration,
        max_delay: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            base_delay,
            increment,
            max_delay,
            timeout,
        }
    }

    /// Run `operation` until it completes, fails, or the time budget runs out.
    ///
    /// The first attempt happens immediately. Before each sleep the policy
    /// checks whether the pause would cross the deadline and returns
    /// `RetryError::Timeout` instead of sleeping uselessly.
    pub async fn attempt<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RetryOutcome<T>, E>>,
    {
        let mut delay = self.base_delay;
        let deadline = Instant::now() + self.timeout;

        loop {
            match operation().await {
                Ok(RetryOutcome::Done(value)) => return Ok(value),
                Ok(RetryOutcome::Retry) => {}
                Err(e) => return Err(RetryError::Operation(e)),
            }

            if Instant::now() + delay > deadline {
                return Err(RetryError::Timeout(self.timeout));
            }

            tokio::time::sleep(delay).await;
            delay = (delay + self.increment).min(self.max_delay);
        }
    }
}

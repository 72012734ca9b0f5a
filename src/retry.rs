//! Classified exponential-backoff retry
//!
//! Every fallible backend call in the crate (page renders, session
//! acquisition, generation requests) runs through [`with_retry`]. Only errors
//! classified [`ErrorCategory::Transient`] are retried; permanent and
//! validation failures, and cancellations, are returned on the spot.
//!
//! # Retry Schedule
//!
//! | Attempt failed | Sleep before next attempt |
//! |----------------|---------------------------|
//! | 1 | base + jitter |
//! | 2 | 2 × base + jitter |
//! | n | 2^(n-1) × base + jitter |
//!
//! Jitter is drawn uniformly from `0..=max_jitter`.
//! A cancelled token ends the sleep early with a cancellation error.

use crate::config::RetryConfig;
use crate::{ErrorCategory, FaqError};
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Errors that know whether they are worth retrying
pub trait Classify {
    fn category(&self) -> ErrorCategory;

    /// Cancelled operations are never retried, whatever their category
    fn is_cancelled(&self) -> bool {
        false
    }

    /// The error reported when a cancellation interrupts the backoff
    fn cancellation(operation: &str) -> Self
    where
        Self: Sized;
}

impl Classify for FaqError {
    fn category(&self) -> ErrorCategory {
        FaqError::category(self)
    }

    fn is_cancelled(&self) -> bool {
        FaqError::is_cancelled(self)
    }

    fn cancellation(operation: &str) -> Self {
        FaqError::cancelled(operation)
    }
}

/// Attempt budget and backoff parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff before the attempt following `failed_attempt`, without jitter
    pub fn backoff_delay(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}

/// Runs `op` until it succeeds, fails non-transiently, or the budget is spent
///
/// `op` receives the 1-based attempt number. The last observed error is
/// returned when every attempt fails.
///
/// Cancelling `cancel` cuts a backoff sleep short. The attempt in flight is
/// not interrupted here; `op` races it against the token itself.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    cancel: &CancellationToken,
    op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    with_retry_notify(policy, operation, Some(cancel), op, |_, _, _| {}).await
}

/// Same as [`with_retry`], calling `notify(error, failed_attempt, backoff)`
/// before each backoff sleep
pub async fn with_retry_notify<T, E, F, Fut, N>(
    policy: &RetryPolicy,
    operation: &str,
    cancel: Option<&CancellationToken>,
    mut op: F,
    mut notify: N,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
    N: FnMut(&E, u32, Duration),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!("{} succeeded on attempt {}", operation, attempt);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if error.is_cancelled() {
            tracing::debug!("{} cancelled on attempt {}", operation, attempt);
            return Err(error);
        }

        match error.category() {
            ErrorCategory::Permanent | ErrorCategory::Validation => {
                tracing::debug!(
                    "{} failed with non-retryable error on attempt {}: {}",
                    operation,
                    attempt,
                    error
                );
                return Err(error);
            }
            ErrorCategory::Transient => {}
        }

        if attempt >= max_attempts {
            tracing::warn!(
                "{} failed after {} attempts: {}",
                operation,
                attempt,
                error
            );
            return Err(error);
        }

        let backoff = policy.backoff_delay(attempt);
        notify(&error, attempt, backoff);

        let delay = backoff + policy.jitter();
        tracing::warn!(
            "{} failed (attempt {}/{}): {}; retrying in {:?}",
            operation,
            attempt,
            max_attempts,
            error,
            delay
        );

        match cancel {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("{} cancelled during backoff", operation);
                        return Err(E::cancellation(operation));
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            None => tokio::time::sleep(delay).await,
        }
        attempt += 1;
    }
}

//! Bounded retry with exponential backoff
//!
//! Operations classify each failure as retryable or not. Retryable failures
//! are attempted again until the budget in [`RetryConfig`] or the context
//! deadline runs out, whichever comes first.

use crate::context::Context;
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

/// Outcome of one failed attempt
#[derive(Debug)]
pub enum RetryError<E> {
    Retryable(E),
    NonRetryable(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Retryable(e) | RetryError::NonRetryable(e) => e,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, RetryError::Retryable(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryFailure<E: Display> {
    #[error("timeout while waiting after {elapsed:?}{}", last_error_suffix(.last_error))]
    Timeout {
        elapsed: Duration,
        last_error: Option<E>,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(E),
}

impl<E: Display> RetryFailure<E> {
    /// The underlying error, if the failure carried one
    pub fn into_error(self) -> Option<E> {
        match self {
            RetryFailure::Timeout { last_error, .. } => last_error,
            RetryFailure::Cancelled => None,
            RetryFailure::Failed(e) => Some(e),
        }
    }
}

fn last_error_suffix<E: Display>(last: &Option<E>) -> String {
    match last {
        Some(e) => format!(", last error: {}", e),
        None => String::new(),
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub timeout: Duration,
    pub min_interval: Duration,
    pub max_interval: Duration,
}

impl RetryConfig {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn with_intervals(mut self, min: Duration, max: Duration) -> Self {
        self.min_interval = min;
        self.max_interval = max.max(min);
        self
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(180),
            min_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
        }
    }
}

/// Runs `op` until it succeeds, fails permanently, or the budget is spent.
///
/// The wait between attempts starts at `min_interval` and doubles up to
/// `max_interval`, clamped so the loop never sleeps past its deadline.
pub async fn retry<T, E, F, Fut>(
    ctx: &Context,
    config: &RetryConfig,
    mut op: F,
) -> Result<T, RetryFailure<E>>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetryError<E>>>,
{
    let start = Instant::now();
    // A budget too large to represent leaves only the context deadline
    let deadline = match (ctx.deadline(), start.checked_add(config.timeout)) {
        (Some(ctx_deadline), Some(budget)) => Some(ctx_deadline.min(budget)),
        (Some(d), None) | (None, Some(d)) => Some(d),
        (None, None) => None,
    };
    let mut interval = config.min_interval;
    let mut last_error = None;
    let mut attempt: u32 = 0;

    loop {
        if ctx.is_cancelled() {
            return Err(cancelled_or_timeout(ctx, start, last_error));
        }

        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(RetryError::NonRetryable(e)) => return Err(RetryFailure::Failed(e)),
            Err(RetryError::Retryable(e)) => {
                tracing::debug!(attempt, error = %e, "retryable error");
                last_error = Some(e);
            }
        }

        let now = Instant::now();
        let wait = match deadline {
            Some(deadline) if now >= deadline => {
                return Err(RetryFailure::Timeout {
                    elapsed: now - start,
                    last_error,
                });
            }
            Some(deadline) => interval.min(deadline - now),
            None => interval,
        };
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = ctx.cancelled() => {
                return Err(cancelled_or_timeout(ctx, start, last_error));
            }
        }
        interval = interval.saturating_mul(2).min(config.max_interval);
    }
}

fn cancelled_or_timeout<E: Display>(
    ctx: &Context,
    start: Instant,
    last_error: Option<E>,
) -> RetryFailure<E> {
    let now = Instant::now();
    if ctx.deadline().is_some_and(|d| now >= d) {
        RetryFailure::Timeout {
            elapsed: now - start,
            last_error,
        }
    } else {
        RetryFailure::Cancelled
    }
}

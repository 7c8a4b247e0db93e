//! TencentCloud API client and per-group service wrappers

pub mod autoscaling;
pub mod client;
pub mod error;
pub mod mariadb;
pub mod mps;
pub mod mysql;
pub mod ratelimit;
pub mod sign;
pub mod vpc;

#[cfg(test)]
pub mod test_helpers;

pub use client::{Client, ClientConfig, Credential, Service};
pub use error::ApiError;

use serde::Deserialize;
use std::future::Future;
use tfplug::context::Context;
use tfplug::retry::{retry, RetryConfig, RetryError, RetryFailure};

/// Response of actions that return nothing beyond their request id
#[derive(Debug, Deserialize)]
pub struct EmptyResponse {}

/// Runs an API call under `config`, retrying transient failures only.
///
/// A timeout hands back the last remote error when there was one, so the
/// caller sees the code TencentCloud reported rather than a bare timeout.
pub async fn with_retry<T, F, Fut>(ctx: &Context, config: &RetryConfig, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let result = retry(ctx, config, || {
        let fut = op();
        async move {
            fut.await.map_err(|e| {
                if e.is_retryable() {
                    RetryError::Retryable(e)
                } else {
                    RetryError::NonRetryable(e)
                }
            })
        }
    })
    .await;

    result.map_err(|failure| match failure {
        RetryFailure::Timeout {
            last_error: Some(e),
            ..
        } => e,
        RetryFailure::Timeout { elapsed, .. } => ApiError::Timeout(elapsed.as_secs()),
        RetryFailure::Cancelled => ApiError::Cancelled,
        RetryFailure::Failed(e) => e,
    })
}

/// First element of a by-id lookup; an empty collection means not found
pub(crate) fn first<T>(items: Vec<T>) -> Option<T> {
    items.into_iter().next()
}

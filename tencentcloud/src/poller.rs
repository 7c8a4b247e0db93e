//! Waiting on asynchronous remote tasks
//!
//! Mutations such as promoting a DR instance return a task id immediately and
//! finish later. [`TaskPoller`] re-queries the task through a
//! [`TaskStatusQuery`] until it reaches a terminal status or the budget runs
//! out.

use async_trait::async_trait;
use std::sync::Mutex;
use tfplug::context::Context;
use tfplug::retry::{retry, RetryConfig, RetryError, RetryFailure};
use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub status: String,
    pub message: String,
}

impl TaskStatus {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }
}

/// Source of task status, one remote lookup per call
#[async_trait]
pub trait TaskStatusQuery: Send + Sync {
    async fn query_status(&self, ctx: &Context, task_id: &str) -> Result<TaskStatus, ApiError>;
}

/// Which status names mean "keep waiting" and which mean "done"
#[derive(Debug, Clone)]
pub struct TaskStatusSet {
    in_progress: Vec<String>,
    success: Vec<String>,
}

impl TaskStatusSet {
    pub fn new(in_progress: &[&str], success: &[&str]) -> Self {
        Self {
            in_progress: in_progress.iter().map(|s| s.to_string()).collect(),
            success: success.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// MySQL async requests: INITIAL and RUNNING are pending, SUCCESS is done.
    /// FAILED, KILLED, REMOVED and PAUSED are terminal failures.
    pub fn mysql_async_request() -> Self {
        Self::new(&["INITIAL", "RUNNING"], &["SUCCESS"])
    }

    pub fn is_success(&self, status: &str) -> bool {
        self.success.iter().any(|s| s == status)
    }

    pub fn is_in_progress(&self, status: &str) -> bool {
        self.in_progress.iter().any(|s| s == status)
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("task {task_id} did not finish in time, last status: {}", .last_status.as_deref().unwrap_or("unknown"))]
    Timeout {
        task_id: String,
        last_status: Option<String>,
    },

    #[error("task {task_id} status is {status}, we won't wait for it finish, it show message:{message}")]
    TaskFailed {
        task_id: String,
        status: String,
        message: String,
    },

    #[error("querying task {task_id} failed: {source}")]
    Query {
        task_id: String,
        #[source]
        source: ApiError,
    },

    #[error("waiting for task {task_id} was cancelled")]
    Cancelled { task_id: String },
}

/// Outcome of one status lookup, before it is folded into a retry decision
#[derive(Debug)]
enum Observation {
    Pending(String),
    Failed(PollError),
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Observation::Pending(status) => write!(f, "task status is {}", status),
            Observation::Failed(e) => write!(f, "{}", e),
        }
    }
}

pub struct TaskPoller {
    statuses: TaskStatusSet,
    config: RetryConfig,
}

impl TaskPoller {
    pub fn new(statuses: TaskStatusSet, config: RetryConfig) -> Self {
        Self { statuses, config }
    }

    /// Blocks until `task_id` succeeds.
    ///
    /// Pending statuses and transient lookup errors are retried until the
    /// budget runs out; any other status fails at once with the remote
    /// message verbatim.
    pub async fn wait(
        &self,
        ctx: &Context,
        task_id: &str,
        query: &dyn TaskStatusQuery,
    ) -> Result<TaskStatus, PollError> {
        let last_status: Mutex<Option<String>> = Mutex::new(None);
        let last_status = &last_status;
        let statuses = &self.statuses;

        let result = retry(ctx, &self.config, move || async move {
            let status = match query.query_status(ctx, task_id).await {
                Ok(status) => status,
                Err(e) if e.is_retryable() => {
                    return Err(RetryError::Retryable(Observation::Failed(PollError::Query {
                        task_id: task_id.to_string(),
                        source: e,
                    })))
                }
                Err(e) => {
                    return Err(RetryError::NonRetryable(Observation::Failed(
                        PollError::Query {
                            task_id: task_id.to_string(),
                            source: e,
                        },
                    )))
                }
            };

            if let Ok(mut last) = last_status.lock() {
                *last = Some(status.status.clone());
            }

            if statuses.is_success(&status.status) {
                return Ok(status);
            }
            if statuses.is_in_progress(&status.status) {
                tracing::debug!(task_id, status = %status.status, "task still in progress");
                return Err(RetryError::Retryable(Observation::Pending(status.status)));
            }
            Err(RetryError::NonRetryable(Observation::Failed(
                PollError::TaskFailed {
                    task_id: task_id.to_string(),
                    status: status.status,
                    message: status.message,
                },
            )))
        })
        .await;

        result.map_err(|failure| match failure {
            RetryFailure::Failed(Observation::Failed(e)) => e,
            RetryFailure::Cancelled => PollError::Cancelled {
                task_id: task_id.to_string(),
            },
            RetryFailure::Failed(Observation::Pending(_)) | RetryFailure::Timeout { .. } => {
                PollError::Timeout {
                    task_id: task_id.to_string(),
                    last_status: last_status
                        .lock()
                        .ok()
                        .and_then(|last| last.clone()),
                }
            }
        })
    }
}

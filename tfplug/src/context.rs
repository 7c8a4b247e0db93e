//! Context implementation for request-scoped data and cancellation
//!
//! This module provides the Context type which carries request-scoped values
//! like cancellation signals, timeouts, and metadata across async boundaries.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};
use tokio::time;

const LOG_ID_KEY: &str = "tfplug.log_id";

/// Context carries request-scoped values like cancellation signals, timeouts, and metadata.
/// Passed as the first parameter to every async trait method.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    values: RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>,
    done: watch::Receiver<bool>,
    _done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                values: RwLock::new(HashMap::new()),
                done: done_rx,
                _done_tx: done_tx,
            }),
        }
    }

    /// Derives a context that is cancelled after `timeout`. An earlier
    /// deadline already on `self` wins. Values are not carried over.
    /// A timeout too large to represent leaves `self` unchanged.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let Some(requested) = Instant::now().checked_add(timeout) else {
            return self;
        };
        let deadline = match self.inner.deadline {
            Some(existing) if existing < requested => existing,
            _ => requested,
        };

        let (done_tx, done_rx) = watch::channel(false);

        let done_tx_clone = done_tx.clone();
        tokio::spawn(async move {
            time::sleep_until(deadline.into()).await;
            let _ = done_tx_clone.send(true);
        });

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                values: RwLock::new(HashMap::new()),
                done: done_rx,
                _done_tx: done_tx,
            }),
        }
    }

    pub async fn with_value<T: Send + Sync + 'static>(self, key: &str, value: T) -> Self {
        let mut values = self.inner.values.write().await;
        values.insert(key.to_string(), Box::new(value));
        drop(values);
        self
    }

    pub async fn get_value<T>(&self, key: &str) -> Option<T>
    where
        T: Send + Sync + Clone + 'static,
    {
        let values = self.inner.values.read().await;
        values.get(key).and_then(|v| v.downcast_ref::<T>()).cloned()
    }

    /// Attaches a fresh log id unless one is already present
    pub async fn with_log_id(self) -> Self {
        if self.get_value::<String>(LOG_ID_KEY).await.is_some() {
            return self;
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.with_value(LOG_ID_KEY, id).await
    }

    /// Log id used to correlate every line emitted for one operation
    pub async fn log_id(&self) -> String {
        self.get_value::<String>(LOG_ID_KEY)
            .await
            .unwrap_or_default()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left before the deadline, `None` when the context has no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns a channel that's closed when work done on behalf of this
    /// context should be cancelled
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn cancelled(&self) {
        let mut done = self.done();
        loop {
            let is_done = *done.borrow_and_update();
            if is_done {
                return;
            }
            if done.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    pub fn cancel(&self) {
        let _ = self.inner._done_tx.send(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

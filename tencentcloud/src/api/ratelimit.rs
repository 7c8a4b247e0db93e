//! Per-action admission control
//!
//! Every API action gets its own token bucket, created on first use. Callers
//! block in [`RateLimiter::check`] until their action has capacity.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Requests per second allowed for an action without an override
pub const DEFAULT_LIMIT: NonZeroU32 = match NonZeroU32::new(20) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

pub struct RateLimiter {
    default_quota: Quota,
    overrides: HashMap<String, Quota>,
    limiters: Mutex<HashMap<String, Arc<DirectLimiter>>>,
}

impl RateLimiter {
    pub fn new(per_second: NonZeroU32) -> Self {
        Self {
            default_quota: Quota::per_second(per_second),
            overrides: HashMap::new(),
            limiters: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_override(mut self, action: &str, per_second: NonZeroU32) -> Self {
        self.overrides
            .insert(action.to_string(), Quota::per_second(per_second));
        self
    }

    /// Waits until `action` may be issued
    pub async fn check(&self, action: &str) {
        let limiter = self.limiter(action);
        if limiter.check().is_err() {
            tracing::debug!(action, "rate limit reached, waiting");
            limiter.until_ready().await;
        }
    }

    fn limiter(&self, action: &str) -> Arc<DirectLimiter> {
        let mut limiters = self
            .limiters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        limiters
            .entry(action.to_string())
            .or_insert_with(|| {
                let quota = self
                    .overrides
                    .get(action)
                    .copied()
                    .unwrap_or(self.default_quota);
                Arc::new(GovernorRateLimiter::direct(quota))
            })
            .clone()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

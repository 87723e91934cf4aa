//! Single-retry wrapper for rate-limited remote calls.
//!
//! When the remote API signals a rate limit, the call is retried exactly once
//! after the advised wait. Any other failure, and a failure of the retry itself,
//! propagates unchanged. The executor keeps no per-call state, so concurrent
//! calls never coordinate their waits.

use std::{future::Future, sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{error::RemoteError, metrics::DispatchMetrics};

/// Wait used when the rate-limit signal carries no advice.
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct RateLimitedExecutor {
    fallback_wait: Duration,
    metrics: Option<Arc<DispatchMetrics>>,
}

impl Default for RateLimitedExecutor {
    fn default() -> Self {
        Self {
            fallback_wait: DEFAULT_RATE_LIMIT_WAIT,
            metrics: None,
        }
    }
}

impl std::fmt::Debug for RateLimitedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedExecutor")
            .field("fallback_wait", &self.fallback_wait)
            .finish()
    }
}

impl RateLimitedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_fallback_wait(mut self, wait: Duration) -> Self {
        self.fallback_wait = wait;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<DispatchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn fallback_wait(&self) -> Duration {
        self.fallback_wait
    }

    /// Run `call`, retrying once if the first attempt is rate-limited.
    ///
    /// `call` is invoked at most twice.
    pub async fn run<F, Fut, T>(&self, operation: &str, mut call: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        match call().await {
            Err(err) if err.is_rate_limited() => {
                let wait = err.retry_after().unwrap_or(self.fallback_wait);
                warn!(
                    operation,
                    wait_ms = wait.as_millis() as u64,
                    "Rate limited by remote API, retrying once"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_rate_limit_retry();
                }
                tokio::time::sleep(wait).await;

                let result = call().await;
                if let Err(retry_err) = &result {
                    debug!(operation, error = %retry_err, "Retry after rate limit failed");
                }
                result
            }
            other => other,
        }
    }
}

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::application::ports::{ErrorClass, Retryable};

/// Wait policy for calls to external services.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; the call runs at most `max_retries + 1` times.
    pub max_retries: u32,
    pub rate_limit_delay: Duration,
    pub timeout_delay: Duration,
    pub initial_delay: Duration,
    pub backoff_multiplier: u32,
    pub max_backoff: Duration,
    /// Deadline for a single attempt. Exceeding it counts as a timeout.
    pub call_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            rate_limit_delay: Duration::from_secs(60),
            timeout_delay: Duration::from_secs(120),
            initial_delay: Duration::from_secs(5),
            backoff_multiplier: 2,
            max_backoff: Duration::from_secs(300),
            call_timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Wait before retry number `retry` (0-based), or `None` when the error must not be
    /// retried at all.
    pub fn delay_for(&self, class: ErrorClass, retry: u32) -> Option<Duration> {
        match class {
            ErrorClass::RateLimited => Some(self.rate_limit_delay),
            ErrorClass::Timeout => Some(self.timeout_delay),
            ErrorClass::Transient => {
                let factor = self.backoff_multiplier.max(1).saturating_pow(retry);
                Some(self.initial_delay.saturating_mul(factor).min(self.max_backoff))
            }
            ErrorClass::Fatal => None,
        }
    }
}

/// Runs `call` until it succeeds, fails fatally, or the retry budget is spent. The last
/// error is returned unchanged; callers decide whether to degrade or propagate.
pub async fn invoke_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut retry = 0;

    loop {
        let outcome = match policy.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call()).await {
                Ok(result) => result,
                Err(_) => Err(E::timed_out(limit)),
            },
            None => call().await,
        };

        let error = match outcome {
            Ok(value) => {
                if retry > 0 {
                    tracing::debug!(operation, retries = retry, "External call recovered");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        let class = error.class();
        let delay = match policy.delay_for(class, retry) {
            Some(delay) if retry < policy.max_retries => delay,
            _ => {
                tracing::error!(
                    operation,
                    attempts = retry + 1,
                    class = ?class,
                    error = %error,
                    "External call failed permanently"
                );
                return Err(error);
            }
        };

        tracing::warn!(
            operation,
            attempt = retry + 1,
            class = ?class,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "External call failed, retrying"
        );
        tokio::time::sleep(delay).await;
        retry += 1;
    }
}

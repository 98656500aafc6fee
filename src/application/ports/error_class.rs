use std::time::Duration;

/// How a failed external call should be treated by the retry controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    RateLimited,
    Timeout,
    Transient,
    Fatal,
}

/// Errors returned by external service adapters.
pub trait Retryable {
    fn class(&self) -> ErrorClass;

    /// Error to report when a call exceeded its deadline.
    fn timed_out(after: Duration) -> Self;
}

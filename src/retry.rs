use crate::error::{codes, BceError};
use http::Method;
use std::fmt::Debug;
use std::time::Duration;

/// Decides whether a failed attempt is repeated and how long to wait first.
///
/// `retries_attempted` is `0` after the first failed attempt.
pub trait RetryPolicy: Debug + Send + Sync {
    fn should_retry(&self, error: &BceError, method: &Method, retries_attempted: u32) -> bool;

    fn delay_before_next_retry(&self, error: &BceError, retries_attempted: u32) -> Duration;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetryPolicy;

impl RetryPolicy for NoRetryPolicy {
    fn should_retry(&self, _: &BceError, _: &Method, _: u32) -> bool {
        false
    }

    fn delay_before_next_retry(&self, _: &BceError, _: u32) -> Duration {
        Duration::ZERO
    }
}

/// Exponential back-off: `base_interval * 2^retries_attempted`, capped at
/// `max_delay`, for at most `max_error_retry` retries.
///
/// Transport failures are only retried for idempotent methods, since the
/// request may have reached the server. Server side 500 / 503 and expired
/// signatures are retried for every method.
#[derive(Debug, Clone)]
pub struct BackOffRetryPolicy {
    pub max_error_retry: u32,
    pub max_delay: Duration,
    pub base_interval: Duration,
}

impl Default for BackOffRetryPolicy {
    fn default() -> Self {
        Self {
            max_error_retry: 3,
            max_delay: Duration::from_secs(20),
            base_interval: Duration::from_millis(300),
        }
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}

impl RetryPolicy for BackOffRetryPolicy {
    fn should_retry(&self, error: &BceError, method: &Method, retries_attempted: u32) -> bool {
        if retries_attempted >= self.max_error_retry {
            return false;
        }

        if error.is_transport() {
            return is_idempotent(method);
        }

        match error.server_error() {
            Some(err) => {
                err.status_code == 500
                    || err.status_code == 503
                    || err.code == codes::REQUEST_EXPIRED
            }
            None => false,
        }
    }

    fn delay_before_next_retry(&self, _: &BceError, retries_attempted: u32) -> Duration {
        let factor = 1u32.checked_shl(retries_attempted).unwrap_or(u32::MAX);
        self.base_interval
            .checked_mul(factor)
            .map(|delay| delay.min(self.max_delay))
            .unwrap_or(self.max_delay)
    }
}

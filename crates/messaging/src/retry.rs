//! Retry engine: strategy abstraction, retryability, delay computation.
//! Retryability itself lives on [`travelclick_common::ErrorKind`] so
//! transport, orchestrator, and tests share one classification.

use std::time::Duration;
use travelclick_common::ErrorKind;

/// `calculateDelay(attempt)→seconds`, `shouldRetry(error-kind)→bool`,
/// `maxAttempts()→int`.
pub trait RetryStrategy: Send + Sync {
    fn calculate_delay(&self, attempt: u32) -> Duration;
    fn max_attempts(&self) -> u32;

    /// Delegates to [`ErrorKind::is_retryable`] — the cross-cutting failure
    /// taxonomy already encodes which kinds retry and under what condition.
    fn should_retry(&self, kind: &ErrorKind) -> bool {
        kind.is_retryable()
    }
}

/// `min(initial * multiplier^(attempt-1), maxDelay)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    pub initial: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(10),
            multiplier: 2.0,
            max_delay: Duration::from_secs(300),
            max_attempts: 3,
        }
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let secs = self.initial.as_secs_f64() * self.multiplier.powi(attempt as i32 - 1);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// `min(initial + increment*(attempt-1), maxDelay)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearBackoff {
    pub initial: Duration,
    pub increment: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(10),
            increment: Duration::from_secs(10),
            max_delay: Duration::from_secs(300),
            max_attempts: 3,
        }
    }
}

impl RetryStrategy for LinearBackoff {
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let secs = self.initial.as_secs_f64() + self.increment.as_secs_f64() * (attempt - 1) as f64;
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_backoff_doubles_each_attempt() {
        let strategy = ExponentialBackoff::default();
        assert_eq!(strategy.calculate_delay(1), Duration::from_secs(10));
        assert_eq!(strategy.calculate_delay(2), Duration::from_secs(20));
        assert_eq!(strategy.calculate_delay(3), Duration::from_secs(40));
    }

    #[test]
    fn exponential_backoff_caps_at_max_delay() {
        let strategy = ExponentialBackoff {
            max_attempts: 10,
            ..ExponentialBackoff::default()
        };
        assert_eq!(strategy.calculate_delay(8), Duration::from_secs(300));
    }

    #[test]
    fn linear_backoff_increments_steadily() {
        let strategy = LinearBackoff::default();
        assert_eq!(strategy.calculate_delay(1), Duration::from_secs(10));
        assert_eq!(strategy.calculate_delay(2), Duration::from_secs(20));
        assert_eq!(strategy.calculate_delay(4), Duration::from_secs(40));
    }

    #[test]
    fn should_retry_delegates_to_error_kind_taxonomy() {
        let strategy = ExponentialBackoff::default();
        assert!(strategy.should_retry(&ErrorKind::Timeout { message: "slow".into() }));
        assert!(!strategy.should_retry(&ErrorKind::Validation {
            message: "bad".into(),
            violations: vec![],
            warnings: vec![],
        }));
    }
}

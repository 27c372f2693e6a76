/*!
 * Retry policy for provider calls.
 */

use rand::Rng;
use std::time::Duration;

use crate::errors::ProviderError;

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Transient failure, try again after a delay
    Retry,
    /// Permanent failure, surface it now
    Fail,
}

/// Attempt budget and exponential backoff schedule
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failure
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Draw each delay uniformly from zero up to its computed value
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Policy that makes a single attempt
    pub fn no_retry() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// Map an error onto retry or fail
    pub fn classify(error: &ProviderError) -> RetryDecision {
        if error.is_retryable() {
            RetryDecision::Retry
        } else {
            RetryDecision::Fail
        }
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed
    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay before the next try, after failed attempt number `attempt` (1-based):
    /// `min(max_delay, base_delay * 2^(attempt - 1))`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        let delay = self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);

        if self.jitter && !delay.is_zero() {
            let millis = delay.as_millis() as u64;
            Duration::from_millis(rand::rng().random_range(0..=millis))
        } else {
            delay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_for_shouldDoubleUntilCap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
        assert_eq!(policy.delay_for(3), Duration::from_secs(10));
        assert_eq!(policy.delay_for(40), Duration::from_secs(10));
    }

    #[test]
    fn test_delay_for_withJitter_shouldStayWithinBound() {
        let policy = RetryPolicy { jitter: true, ..RetryPolicy::default() };
        for attempt in 1..5 {
            assert!(policy.delay_for(attempt) <= Duration::from_secs(10));
        }
    }

    #[test]
    fn test_classify_shouldSeparateTransientFromPermanent() {
        assert_eq!(
            RetryPolicy::classify(&ProviderError::Timeout("slow".into())),
            RetryDecision::Retry
        );
        assert_eq!(
            RetryPolicy::classify(&ProviderError::ParseError("junk".into())),
            RetryDecision::Fail
        );
    }

    #[test]
    fn test_has_attempts_left_shouldRespectBudget() {
        let policy = RetryPolicy::default();
        assert!(policy.has_attempts_left(2));
        assert!(!policy.has_attempts_left(3));
        assert!(!RetryPolicy::no_retry().has_attempts_left(1));
    }
}

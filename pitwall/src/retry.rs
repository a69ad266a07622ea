//! Retry policy for transient backend failures.
//!
//! Used by the regulations client to bound how many times a transient error
//! (rate limit, 5xx, transport) is retried and how long to wait between
//! attempts.

use std::time::Duration;

/// How many attempts to make in total and how to space them.
#[derive(Debug, Clone)]
pub enum RetryPolicy {
    /// Single attempt, no retry.
    None,
    /// Constant delay between attempts.
    Fixed {
        /// Total attempts, including the first.
        max_attempts: usize,
        interval: Duration,
    },
    /// Exponentially growing delay, capped at `max_interval`.
    Exponential {
        /// Total attempts, including the first.
        max_attempts: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    },
}

impl RetryPolicy {
    pub fn fixed(max_attempts: usize, interval: Duration) -> Self {
        RetryPolicy::Fixed {
            max_attempts,
            interval,
        }
    }

    pub fn exponential(
        max_attempts: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    ) -> Self {
        RetryPolicy::Exponential {
            max_attempts,
            initial_interval,
            max_interval,
            multiplier,
        }
    }

    /// Total attempts this policy allows; at least one call is always made.
    pub fn max_attempts(&self) -> usize {
        match self {
            RetryPolicy::None => 1,
            RetryPolicy::Fixed { max_attempts, .. }
            | RetryPolicy::Exponential { max_attempts, .. } => (*max_attempts).max(1),
        }
    }

    /// Delay to wait after the failed attempt with the given zero-based index.
    pub fn delay(&self, attempt: usize) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Fixed { interval, .. } => *interval,
            RetryPolicy::Exponential {
                initial_interval,
                max_interval,
                multiplier,
                ..
            } => {
                let secs = initial_interval.as_secs_f64() * multiplier.powi(attempt as i32);
                Duration::from_secs_f64(secs).min(*max_interval)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_allows_one_attempt() {
        let policy = RetryPolicy::None;
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delay(0), Duration::ZERO);
    }

    #[test]
    fn fixed_uses_constant_interval() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(50));
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(0), Duration::from_millis(50));
        assert_eq!(policy.delay(2), Duration::from_millis(50));
    }

    #[test]
    fn exponential_grows_and_caps() {
        let policy =
            RetryPolicy::exponential(4, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(2), Duration::from_secs(4));
        // 1 * 2^3 = 8, capped at 5.
        assert_eq!(policy.delay(3), Duration::from_secs(5));
    }

    #[test]
    fn zero_max_attempts_still_means_one_call() {
        let policy = RetryPolicy::fixed(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
    }
}

//! Adaptive retry spacing for pull-model polling.

use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

/// Default delay after the first empty poll.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(100);

/// Default ceiling on the backoff delay (15 minutes).
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(15 * 60);

// ============================================================================
// Polling Policy
// ============================================================================

/// Strategy deciding how long to wait between empty polls.
///
/// One policy instance belongs to exactly one receiver loop and is mutated
/// on every poll outcome; it is never shared.
pub trait PollingPolicy: Send {
    /// Delay to wait before the next poll. Called once per empty poll;
    /// consecutive calls without a reset must not decrease the delay.
    fn next_delay(&mut self) -> Duration;

    /// Return to the minimum delay. Called after a non-empty poll.
    fn reset(&mut self);
}

// ============================================================================
// Exponential Backoff
// ============================================================================

/// Doubles the delay per consecutive empty poll, capped at a maximum.
#[derive(Debug, Clone)]
pub struct ExponentialBackoffPolicy {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl ExponentialBackoffPolicy {
    /// Create a policy ranging from `min` to `max`.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        let max = max.max(min);
        Self { min, max, current: min }
    }
}

impl Default for ExponentialBackoffPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl PollingPolicy for ExponentialBackoffPolicy {
    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    fn reset(&mut self) {
        self.current = self.min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_up_to_the_cap() {
        let mut policy = ExponentialBackoffPolicy::new(
            Duration::from_millis(100),
            Duration::from_millis(350),
        );

        assert_eq!(policy.next_delay(), Duration::from_millis(100));
        assert_eq!(policy.next_delay(), Duration::from_millis(200));
        assert_eq!(policy.next_delay(), Duration::from_millis(350));
        assert_eq!(policy.next_delay(), Duration::from_millis(350));
    }

    #[test]
    fn consecutive_delays_never_decrease() {
        let mut policy = ExponentialBackoffPolicy::default();
        let mut last = Duration::ZERO;
        for _ in 0..32 {
            let delay = policy.next_delay();
            assert!(delay >= last);
            last = delay;
        }
        assert_eq!(last, DEFAULT_MAX_DELAY);
    }

    #[test]
    fn reset_returns_to_minimum() {
        let mut policy = ExponentialBackoffPolicy::default();
        for _ in 0..5 {
            policy.next_delay();
        }
        policy.reset();
        assert_eq!(policy.next_delay(), DEFAULT_MIN_DELAY);
    }

    #[test]
    fn max_below_min_is_clamped() {
        let mut policy = ExponentialBackoffPolicy::new(
            Duration::from_secs(1),
            Duration::from_millis(10),
        );
        assert_eq!(policy.next_delay(), Duration::from_secs(1));
        assert_eq!(policy.next_delay(), Duration::from_secs(1));
    }
}

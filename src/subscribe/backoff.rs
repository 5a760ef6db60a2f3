//! Exponential reconnect backoff.

use std::time::Duration;

/// Shortest delay between reconnect attempts.
pub const MIN_DELAY: Duration = Duration::from_secs(1);

/// Doubling delay between reconnect attempts, capped at a maximum.
///
/// Both bounds are floored at [`MIN_DELAY`] so a zero setting cannot
/// turn the reconnect loop into a busy spin.
///
/// ```
/// use std::time::Duration;
/// use benchwatch::subscribe::Backoff;
///
/// let mut backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(60));
/// assert_eq!(backoff.next_delay(), Duration::from_secs(5));
/// assert_eq!(backoff.next_delay(), Duration::from_secs(10));
/// backoff.reset();
/// assert_eq!(backoff.next_delay(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(MIN_DELAY);
        let initial = initial.clamp(MIN_DELAY, max);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// The delay to wait before the next attempt, without advancing.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Return the delay for this failure and double it for the next one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    /// Back to the initial delay after a successful connect.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

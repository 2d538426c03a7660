use std::{cmp, thread, time::Duration};

use rand::{thread_rng, Rng};
use tracing::trace;

/// Initial backoff wait range.
pub const MIN_WAIT: Duration = Duration::from_millis(1);
/// Ultimate backoff wait range.
pub const MAX_WAIT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    min_wait: Duration,
    max_wait: Duration,
}

impl BackoffConfig {
    /// # Panics
    ///
    /// Panics if `min_wait` is zero or `min_wait > max_wait`.
    pub fn new(min_wait: Duration, max_wait: Duration) -> Self {
        // a zero floor would keep the doubled ceiling at zero forever
        assert!(!min_wait.is_zero(), "backoff min_wait must be nonzero");
        assert!(
            min_wait <= max_wait,
            "backoff min_wait {:?} exceeds max_wait {:?}",
            min_wait,
            max_wait
        );

        Self { min_wait, max_wait }
    }

    pub fn min_wait(&self) -> Duration {
        self.min_wait
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_wait: MIN_WAIT,
            max_wait: MAX_WAIT,
        }
    }
}

/// Randomized exponential backoff for a single logical operation.
///
/// Each `snooze` sleeps for a random duration in `[min_wait, ceiling)` and then doubles the
/// ceiling, capped at `max_wait`. Create one per push/pop call; it is not meant to be shared.
#[derive(Debug)]
pub struct Backoff {
    config: BackoffConfig,
    ceiling: Duration,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            ceiling: config.min_wait,
        }
    }

    /// Current upper bound of the random wait.
    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    pub fn reset(&mut self) {
        self.ceiling = self.config.min_wait;
    }

    /// Draw the next wait without sleeping or growing the ceiling.
    pub fn next_wait(&self) -> Duration {
        let range = self.ceiling - self.config.min_wait;

        if range.is_zero() {
            return self.config.min_wait;
        }

        let ratio: f64 = thread_rng().gen();
        // float rounding near `Duration::MAX` may overshoot, so clamp to the range
        let jitter = Duration::try_from_secs_f64(range.as_secs_f64() * ratio)
            .map_or(range, |jitter| cmp::min(jitter, range));

        self.config.min_wait + jitter
    }

    /// Sleep for a random wait, then grow the ceiling.
    pub fn snooze(&mut self) {
        let wait = self.next_wait();
        trace!(?wait, ceiling = ?self.ceiling, "backoff");

        thread::sleep(wait);
        self.grow();
    }

    fn grow(&mut self) {
        self.ceiling = cmp::min(self.ceiling.saturating_mul(2), self.config.max_wait);
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}

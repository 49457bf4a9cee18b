//! Client-side pacing of upstream requests.

use std::time::Duration;

use tokio::time::Instant;

/// Default minimum interval between upstream requests (~40 req/s).
pub(crate) const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(25);

/// Enforces a minimum gap between consecutive upstream requests.
///
/// TMDB allows roughly 40 requests per second. Only cache misses reach the
/// limiter, so cached reads are never delayed. A zero interval disables it.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    /// Minimum interval between requests.
    min_interval: Duration,
    /// Deadline before which the next request must not start.
    next_allowed: Option<Instant>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_allowed: None,
        }
    }

    /// Waits until the next request is allowed, then reserves the slot.
    pub(crate) async fn wait(&mut self) {
        if self.min_interval.is_zero() {
            return;
        }

        if let Some(deadline) = self.next_allowed {
            tokio::time::sleep_until(deadline).await;
        }

        let now = Instant::now();
        self.next_allowed = now.checked_add(self.min_interval);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

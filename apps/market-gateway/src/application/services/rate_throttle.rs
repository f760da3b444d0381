//! Minimum spacing between primary-provider data calls.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Process-wide inter-call throttle.
///
/// Each caller reserves the next dispatch slot under the lock and only then
/// sleeps, so concurrent callers always receive distinct slots at least
/// `min_delay` apart.
#[derive(Debug)]
pub struct RateThrottle {
    min_delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateThrottle {
    /// Create a throttle.
    #[must_use]
    pub const fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last: Mutex::new(None),
        }
    }

    /// Configured spacing.
    #[must_use]
    pub const fn min_delay(&self) -> Duration {
        self.min_delay
    }

    fn reserve(&self) -> Instant {
        let now = Instant::now();
        let mut last = self.last.lock();
        let slot = last.map_or(now, |previous| (previous + self.min_delay).max(now));
        *last = Some(slot);
        slot
    }

    /// Wait until this caller may dispatch. Returns the time spent waiting.
    pub async fn await_slot(&self) -> Duration {
        let slot = self.reserve();
        let wait = slot.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            tracing::debug!(delay_ms = wait.as_millis() as u64, "Throttling provider call");
            tokio::time::sleep_until(slot).await;
        }
        crate::observability::record_throttle_wait(wait.as_secs_f64());
        wait
    }
}

impl Default for RateThrottle {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

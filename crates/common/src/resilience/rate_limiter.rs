//! Minimum-interval rate gate
//!
//! Enforces a fixed spacing between consecutive calls that pass through the
//! same gate, regardless of which caller issued them or whether they are
//! retries. Callers that arrive early wait in line; the gate's only state is
//! the time the previous call was released.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Shared gate that releases at most one call per `interval`.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use blockgate_common::resilience::MinIntervalGate;
///
/// # async fn example() {
/// let gate = MinIntervalGate::new(Duration::from_millis(250));
/// gate.acquire().await; // released immediately
/// gate.acquire().await; // released 250ms after the first
/// # }
/// ```
#[derive(Debug)]
pub struct MinIntervalGate {
    interval: Duration,
    last_release: Mutex<Option<Instant>>,
}

impl MinIntervalGate {
    /// Create a gate enforcing `interval` between releases.
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_release: Mutex::new(None) }
    }

    /// Gate that never waits.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Configured spacing between releases.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the gate allows the next call.
    ///
    /// The lock is held across the wait so concurrent callers are released
    /// one interval apart, in arrival order.
    pub async fn acquire(&self) {
        let mut last_release = self.last_release.lock().await;

        if let Some(previous) = *last_release {
            let ready_at = previous + self.interval;
            let now = Instant::now();
            if ready_at > now {
                let wait = ready_at - now;
                debug!(wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX), "rate gate waiting");
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_release = Some(Instant::now());
    }
}

impl Default for MinIntervalGate {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Client-side request budget for an upstream price API.
///
/// Callers `wait` before each outbound request; when the budget is spent the
/// call sleeps until the limiter releases the next cell.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Arc<DirectRateLimiter>,
    clock: DefaultClock,
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle").finish_non_exhaustive()
    }
}

impl RequestThrottle {
    /// Allows `limit` requests per `window`, all of which may burst at once.
    pub fn new(window: Duration, limit: u32) -> Self {
        let clock = DefaultClock::default();
        Self {
            limiter: Arc::new(RateLimiter::direct_with_clock(quota(window, limit), &clock)),
            clock,
        }
    }

    /// Non-blocking check; consumes a cell when one is available.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    pub async fn wait(&self) {
        while let Err(not_until) = self.limiter.check() {
            let delay = not_until.wait_time_from(self.clock.now());
            tracing::debug!(delay_ms = delay.as_millis() as u64, "request throttled");
            tokio::time::sleep(delay).await;
        }
    }
}

fn quota(window: Duration, limit: u32) -> Quota {
    let burst = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);
    let period = Duration::from_secs_f64(
        (window.as_secs_f64() / f64::from(burst.get())).max(0.001),
    );
    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

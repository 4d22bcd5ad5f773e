use crate::domain::ports::{Clock, RateLimiter};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[async_trait]
impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

/// Lets a request through only when `min_interval` has passed since the
/// previous one. The first request is never delayed.
pub struct MinIntervalGate<C: Clock> {
    clock: C,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl MinIntervalGate<SystemClock> {
    pub fn new(min_interval: Duration) -> Self {
        Self::with_clock(SystemClock, min_interval)
    }
}

impl<C: Clock> MinIntervalGate<C> {
    pub fn with_clock(clock: C, min_interval: Duration) -> Self {
        Self {
            clock,
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

#[async_trait]
impl<C: Clock> RateLimiter for MinIntervalGate<C> {
    async fn acquire(&self) {
        let mut last_request = self.last_request.lock().await;

        if let Some(previous) = *last_request {
            let elapsed = self.clock.now().saturating_duration_since(previous);
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!("⏳ Pacing: waiting {:?} before next request", wait);
                self.clock.sleep(wait).await;
            }
        }

        *last_request = Some(self.clock.now());
    }
}

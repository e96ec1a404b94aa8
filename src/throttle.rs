use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Clock and sleep dependency, injectable so pacing is testable without
/// real delays.
#[async_trait]
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Runtime clock backed by tokio's timer
#[derive(Debug, Default)]
pub struct TokioTime;

#[async_trait]
impl TimeSource for TokioTime {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Enforces a minimum spacing between consecutive outbound calls. Fixed
/// pacing only: no backoff, no retry, no burst allowance.
pub struct Throttle {
    min_interval: Duration,
    time: Arc<dyn TimeSource>,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self::with_time_source(min_interval, Arc::new(TokioTime))
    }

    pub fn with_time_source(min_interval: Duration, time: Arc<dyn TimeSource>) -> Self {
        Self {
            min_interval,
            time,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until at least `min_interval` has passed since the previous
    /// acquire returned. The first acquire never waits.
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = self.time.now().duration_since(last);
            if elapsed < self.min_interval {
                self.time.sleep(self.min_interval - elapsed).await;
            }
        }
        *last_call = Some(self.time.now());
    }
}

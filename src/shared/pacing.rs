//! Request pacing for rate-limited external APIs

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Strategy applied between consecutive calls to an external service
#[async_trait]
pub trait RequestPacer: Send + Sync {
    async fn pause(&self);
}

/// No waiting at all; used in tests and against local endpoints
pub struct NoDelay;

#[async_trait]
impl RequestPacer for NoDelay {
    async fn pause(&self) {}
}

/// Constant sleep between calls
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait]
impl RequestPacer for FixedDelay {
    async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

/// Pick the pacer matching a configured delay
pub fn pacer_for_delay(delay_ms: u64) -> Arc<dyn RequestPacer> {
    if delay_ms == 0 {
        Arc::new(NoDelay)
    } else {
        Arc::new(FixedDelay::from_millis(delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_fixed_delay_waits() {
        let pacer = FixedDelay::from_millis(20);
        let started = Instant::now();
        pacer.pause().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_zero_delay_does_not_sleep() {
        let pacer = pacer_for_delay(0);
        let started = Instant::now();
        pacer.pause().await;
        assert!(started.elapsed() < Duration::from_millis(20));
    }
}

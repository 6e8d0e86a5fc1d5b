//! Pause policy applied after each remote call

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Default pause after each request
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Decides how long the orchestrator waits after a remote call
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Sleeps for a fixed duration after every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_REQUEST_DELAY)
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self) {
        trace!(delay_ms = self.0.as_millis(), "Pausing before next request");
        tokio::time::sleep(self.0).await;
    }
}

/// Never waits
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self) {}
}

/// Picks [`NoDelay`] for a zero delay and [`FixedDelay`] otherwise.
pub fn pacer_for(delay: Duration) -> Arc<dyn Pacer> {
    if delay.is_zero() {
        Arc::new(NoDelay)
    } else {
        Arc::new(FixedDelay(delay))
    }
}

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

/// Source of the monitor's polling rhythm.
#[async_trait]
pub trait Ticker: Send {
    /// Resolves when the next sample is due.
    async fn tick(&mut self);
}

/// Sleeps a fixed interval before every sample.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTicker {
    interval: Duration,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        sleep(self.interval).await;
    }
}

//! Injectable time source.
//!
//! Backoff timing is part of the crawl loop's contract, so sleeping goes
//! through a trait the tests can replace with a recording clock that returns
//! immediately.

use async_trait::async_trait;
use std::time::Duration;

/// Sleep provider used by the crawl loop for its backoff waits.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, period: Duration);
}

/// Tokio-backed clock used by the binaries.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}

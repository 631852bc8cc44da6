// src/crawl/rate.rs
// =============================================================================
// Polite crawling: a pause before every page fetch and every link probe.
//
// The delay is a strategy object rather than a bare sleep so that tests (and
// `--rate-limit-ms 0`) can turn it off without touching the crawl code.
//
// Not delayed: the one-off robots.txt and sitemap.xml requests, and the
// follow-up requests inside a single probe (the GET retry after a rejected
// HEAD, and each redirect hop). A probe counts as one request here.
// =============================================================================

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Waits until the next request may be sent.
    async fn wait(&self);
}

/// Sleeps for a fixed duration before each request.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

#[async_trait]
impl RateLimiter for FixedDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RateLimiter for NoDelay {
    async fn wait(&self) {}
}

/// Counts waits instead of sleeping.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CountingLimiter {
    waits: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl CountingLimiter {
    pub fn waits(&self) -> usize {
        self.waits.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl RateLimiter for CountingLimiter {
    async fn wait(&self) {
        self.waits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

/// Picks the limiter for a configured delay.
pub fn from_delay(delay: Duration) -> Box<dyn RateLimiter> {
    if delay.is_zero() {
        Box::new(NoDelay)
    } else {
        Box::new(FixedDelay(delay))
    }
}

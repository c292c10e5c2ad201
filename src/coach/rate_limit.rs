use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::async_trait;
use moka::future::Cache;

/// Per-key request budget over fixed windows.
///
/// The in-process implementation only limits a single instance; a store
/// shared between instances can be plugged in behind the same trait.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Counts one request for `key`. `false` once the current window is spent.
    async fn try_acquire(&self, key: &str) -> bool;
}

pub struct MokaRateLimiter {
    counters: Cache<String, u32>,
    limit: u32,
    window: Duration,
}

impl MokaRateLimiter {
    /// `limit == 0` disables limiting.
    pub fn new(limit: u32, window: Duration) -> Self {
        let window = window.max(Duration::from_secs(1));
        let counters = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(window)
            .build();
        Self {
            counters,
            limit,
            window,
        }
    }

    fn window_index(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        now / self.window.as_secs().max(1)
    }
}

#[async_trait]
impl RateLimitStore for MokaRateLimiter {
    async fn try_acquire(&self, key: &str) -> bool {
        if self.limit == 0 {
            return true;
        }
        let cache_key = format!("{key}:{}", self.window_index());
        let entry = self
            .counters
            .entry(cache_key)
            .and_upsert_with(|current| {
                let next = current.map_or(1, |e| e.into_value().saturating_add(1));
                std::future::ready(next)
            })
            .await;
        entry.into_value() <= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn budget_is_per_key() {
        let limiter = MokaRateLimiter::new(2, Duration::from_secs(3600));
        assert!(limiter.try_acquire("a@b.co").await);
        assert!(limiter.try_acquire("a@b.co").await);
        assert!(!limiter.try_acquire("a@b.co").await);
        assert!(!limiter.try_acquire("a@b.co").await);
        assert!(limiter.try_acquire("c@d.co").await);
    }

    #[tokio::test]
    async fn zero_limit_disables() {
        let limiter = MokaRateLimiter::new(0, Duration::from_secs(60));
        for _ in 0..50 {
            assert!(limiter.try_acquire("a@b.co").await);
        }
    }
}

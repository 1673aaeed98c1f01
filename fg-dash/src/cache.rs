//! TTL cache for ERP reads
//!
//! Each ERP collection gets one slot. A read within the TTL returns the
//! cached rows without touching the ERP; after expiry the next read
//! refetches and replaces the slot.

use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Single-value cache slot with a time-to-live
pub struct TtlCache<T: Clone> {
    slot: RwLock<Option<(Instant, T)>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    /// Return the cached value if it is still fresh
    pub async fn get(&self) -> Option<T> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    /// Store a fresh value
    pub async fn put(&self, value: T) {
        let mut slot = self.slot.write().await;
        *slot = Some((Instant::now(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_cache_misses() {
        let cache: TtlCache<Vec<i32>> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn fresh_value_hits() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put(vec![1, 2, 3]).await;
        assert_eq!(cache.get().await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn expired_value_misses() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.put(vec![1]).await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn put_replaces_stale_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put(vec![1]).await;
        cache.put(vec![2]).await;
        assert_eq!(cache.get().await, Some(vec![2]));
    }
}

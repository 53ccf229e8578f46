use crate::core::cache::RateStore;
use crate::core::currency::{CachedRate, CurrencyPair};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory rate store using a HashMap behind a Mutex
#[derive(Default)]
pub struct MemoryRateStore {
    inner: Mutex<HashMap<CurrencyPair, CachedRate>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn get(&self, pair: &CurrencyPair) -> Option<CachedRate> {
        let rates = self.inner.lock().await;
        let entry = rates.get(pair).cloned();
        if entry.is_none() {
            debug!("Cache MISS for key: {}", pair.key());
        }
        entry
    }

    async fn put(&self, rate: CachedRate) {
        let mut rates = self.inner.lock().await;
        rates.insert(rate.pair.clone(), rate);
    }

    async fn evict(&self, entry: &CachedRate) {
        let mut rates = self.inner.lock().await;
        if rates.get(&entry.pair) == Some(entry) {
            rates.remove(&entry.pair);
            debug!("Cache REMOVE for key: {}", entry.pair.key());
        }
    }

    async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    async fn list(&self) -> Vec<CachedRate> {
        self.inner.lock().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn rate(from: &str, to: &str, value: f64) -> CachedRate {
        CachedRate {
            pair: CurrencyPair::new(from, to),
            rate: value,
            fetched_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_get_put() {
        let store = MemoryRateStore::new();
        let pair = CurrencyPair::new("USD", "GBP");
        assert!(store.get(&pair).await.is_none());

        let entry = rate("USD", "GBP", 0.77);
        store.put(entry.clone()).await;
        assert_eq!(store.get(&pair).await, Some(entry));
    }

    #[tokio::test]
    async fn test_memory_store_evict_skips_newer_entry() {
        let store = MemoryRateStore::new();
        let mut old = rate("USD", "GBP", 0.70);
        old.fetched_at = Utc::now() - Duration::hours(2);
        let new = rate("USD", "GBP", 0.80);

        store.put(new.clone()).await;
        store.evict(&old).await;
        assert_eq!(store.get(&new.pair).await, Some(new.clone()));

        store.evict(&new).await;
        assert!(store.get(&new.pair).await.is_none());
    }

    #[tokio::test]
    async fn test_memory_store_clear_and_list() {
        let store = MemoryRateStore::new();
        store.put(rate("USD", "GBP", 0.77)).await;
        store.put(rate("GBP", "USD", 1.29)).await;
        assert_eq!(store.list().await.len(), 2);

        store.clear().await;
        assert!(store.list().await.is_empty());
    }
}

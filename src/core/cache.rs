use crate::core::currency::{CachedRate, CurrencyPair};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

/// Cached rates older than this are stale and get evicted on read.
pub const FRESHNESS_WINDOW_SECS: i64 = 3600;

/// Backing storage for cached rates, at most one entry per ordered pair.
///
/// Implementations swallow their own I/O failures: a store that cannot read
/// reports absence, a store that cannot write drops the write.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn get(&self, pair: &CurrencyPair) -> Option<CachedRate>;

    /// Replaces any existing entry for `rate.pair`.
    async fn put(&self, rate: CachedRate);

    /// Removes `entry` only if it is still the stored value for its pair, so a
    /// concurrent `put` of a newer rate survives eviction of the old one.
    async fn evict(&self, entry: &CachedRate);

    async fn clear(&self);

    async fn list(&self) -> Vec<CachedRate>;
}

/// Time-bounded rate cache layered over a [`RateStore`].
#[derive(Clone)]
pub struct RateCache {
    store: Arc<dyn RateStore>,
}

impl RateCache {
    pub fn new(store: Arc<dyn RateStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, pair: &CurrencyPair) -> Option<CachedRate> {
        self.get_at(pair, Utc::now()).await
    }

    /// Freshness check against an explicit `now`. Stale entries are removed.
    pub async fn get_at(&self, pair: &CurrencyPair, now: DateTime<Utc>) -> Option<CachedRate> {
        let entry = self.store.get(pair).await?;
        if now - entry.fetched_at < Duration::seconds(FRESHNESS_WINDOW_SECS) {
            debug!(%pair, rate = entry.rate, "Cache HIT");
            return Some(entry);
        }
        debug!(%pair, fetched_at = %entry.fetched_at, "Cache entry expired, evicting");
        self.store.evict(&entry).await;
        None
    }

    pub async fn put(&self, pair: CurrencyPair, rate: f64, fetched_at: DateTime<Utc>) {
        debug!(%pair, rate, "Cache PUT");
        self.store
            .put(CachedRate {
                pair,
                rate,
                fetched_at,
            })
            .await;
    }

    pub async fn clear(&self) {
        self.store.clear().await;
        debug!("Cache CLEAR");
    }

    pub async fn list_all(&self) -> Vec<CachedRate> {
        self.store.list().await
    }
}

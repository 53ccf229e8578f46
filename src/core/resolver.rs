//! Get-or-fetch entry point combining the rate cache and a provider

use crate::core::cache::RateCache;
use crate::core::currency::{CachedRate, CurrencyPair, RateProvider};
use crate::core::error::ExchangeError;
use chrono::Utc;
use futures::future::join_all;
use tracing::debug;

/// An amount converted at a resolved rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub pair: CurrencyPair,
    pub amount: f64,
    pub rate: f64,
    pub converted: f64,
}

/// Serves rates from the cache while fresh, otherwise from the provider.
///
/// Concurrent misses for the same pair are not coalesced: each caller fetches
/// and the last write wins in the cache. Provider errors are returned as-is and
/// never cached.
pub struct RateResolver<P: RateProvider> {
    cache: RateCache,
    provider: P,
}

impl<P: RateProvider> RateResolver<P> {
    pub fn new(cache: RateCache, provider: P) -> Self {
        Self { cache, provider }
    }

    /// Returns how many units of `to` one unit of `from` buys.
    pub async fn resolve(&self, from: &str, to: &str) -> Result<f64, ExchangeError> {
        let pair = CurrencyPair::new(from, to);
        if let Some(cached) = self.cache.get(&pair).await {
            debug!("Using cached rate for {}: {}", pair, cached.rate);
            return Ok(cached.rate);
        }

        debug!("Cache miss for {}, fetching", pair);
        let fetched = self.provider.fetch(&pair).await?;
        if !(fetched.rate.is_finite() && fetched.rate > 0.0) {
            debug!("Provider returned unusable rate for {}: {}", pair, fetched.rate);
            return Err(ExchangeError::InvalidResponse);
        }
        self.cache.put(pair, fetched.rate, Utc::now()).await;
        Ok(fetched.rate)
    }

    /// Resolves `from` against each target concurrently. Results keep the order
    /// of `targets` and fail independently.
    pub async fn resolve_many(
        &self,
        from: &str,
        targets: &[String],
    ) -> Vec<(String, Result<f64, ExchangeError>)> {
        let lookups = targets.iter().map(|to| async move {
            let result = self.resolve(from, to).await;
            (to.clone(), result)
        });
        join_all(lookups).await
    }

    /// Converts `amount` of `from` into `to`.
    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<Conversion, ExchangeError> {
        let rate = self.resolve(from, to).await?;
        Ok(Conversion {
            pair: CurrencyPair::new(from, to),
            amount,
            rate,
            converted: amount * rate,
        })
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn list_cached_rates(&self) -> Vec<CachedRate> {
        self.cache.list_all().await
    }
}

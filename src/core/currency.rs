//! Currency pair abstractions and the rate provider seam

use crate::core::error::ExchangeError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Ordered pair of currency codes. `USD/GBP` and `GBP/USD` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub from: String,
    pub to: String,
}

impl CurrencyPair {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.trim().to_uppercase(),
            to: to.trim().to_uppercase(),
        }
    }

    /// Storage key, e.g. `USD_GBP`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.from, self.to)
    }

    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// A rate held by the cache: 1 `pair.from` = `rate` `pair.to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRate {
    pub pair: CurrencyPair,
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

/// A rate derived from the upstream feed, before it is cached.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRate {
    pub pair: CurrencyPair,
    pub rate: f64,
    /// Feed-reported observation time, or the fetch time if the feed omits it.
    pub observed_at: DateTime<Utc>,
}

/// A currency offered for selection, with its display name and flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

const fn currency(code: &'static str, name: &'static str, flag: &'static str) -> Currency {
    Currency { code, name, flag }
}

pub const SUPPORTED_CURRENCIES: [Currency; 19] = [
    currency("USD", "US Dollar", "🇺🇸"),
    currency("GBP", "British Pound", "🇬🇧"),
    currency("JPY", "Japanese Yen", "🇯🇵"),
    currency("PLN", "Polish Zloty", "🇵🇱"),
    currency("CAD", "Canadian Dollar", "🇨🇦"),
    currency("AUD", "Australian Dollar", "🇦🇺"),
    currency("CHF", "Swiss Franc", "🇨🇭"),
    currency("CNY", "Chinese Yuan", "🇨🇳"),
    currency("NGN", "Nigerian Naira", "🇳🇬"),
    currency("INR", "Indian Rupee", "🇮🇳"),
    currency("BRL", "Brazilian Real", "🇧🇷"),
    currency("ZAR", "South African Rand", "🇿🇦"),
    currency("MXN", "Mexican Peso", "🇲🇽"),
    currency("SEK", "Swedish Krona", "🇸🇪"),
    currency("NOK", "Norwegian Krone", "🇳🇴"),
    currency("DKK", "Danish Krone", "🇩🇰"),
    currency("SGD", "Singapore Dollar", "🇸🇬"),
    currency("HKD", "Hong Kong Dollar", "🇭🇰"),
    currency("KRW", "South Korean Won", "🇰🇷"),
];

/// Case-insensitive substring match on code or name, in catalog order.
/// A blank query matches everything.
pub fn search_currencies(query: &str) -> Vec<&'static Currency> {
    let needle = query.trim().to_lowercase();
    SUPPORTED_CURRENCIES
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.code.to_lowercase().contains(&needle)
                || c.name.to_lowercase().contains(&needle)
        })
        .collect()
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch(&self, pair: &CurrencyPair) -> Result<FetchedRate, ExchangeError>;
}

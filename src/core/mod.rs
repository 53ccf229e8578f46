//! Core exchange rate abstractions

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod resolver;

// Re-export main types for cleaner imports
pub use cache::{FRESHNESS_WINDOW_SECS, RateCache, RateStore};
pub use currency::{
    CachedRate, Currency, CurrencyPair, FetchedRate, RateProvider, SUPPORTED_CURRENCIES,
    search_currencies,
};
pub use error::ExchangeError;
pub use resolver::{Conversion, RateResolver};

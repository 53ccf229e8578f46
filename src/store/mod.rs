pub mod disk;
pub mod memory;

use crate::core::cache::{RateCache, RateStore};
use crate::core::config::AppConfig;
use disk::DiskRateStore;
use memory::MemoryRateStore;
use std::sync::Arc;
use tracing::debug;

/// A cache that lives only as long as the process.
pub fn memory_rate_cache() -> RateCache {
    RateCache::new(Arc::new(MemoryRateStore::new()))
}

/// Builds the rate cache the config asks for. A disk store that cannot be
/// opened degrades to an in-memory one.
pub fn open_rate_cache(config: &AppConfig) -> RateCache {
    if !config.cache.persist {
        return memory_rate_cache();
    }

    let store: Arc<dyn RateStore> = match config
        .default_data_path()
        .and_then(|path| DiskRateStore::open(&path.join("cache")))
    {
        Ok(store) => Arc::new(store),
        Err(e) => {
            debug!("Falling back to in-memory rate cache: {}", e);
            Arc::new(MemoryRateStore::new())
        }
    };
    RateCache::new(store)
}

use crate::core::cache::RateStore;
use crate::core::currency::{CachedRate, CurrencyPair};
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

const RATES_PARTITION: &str = "rates";

/// Persistent rate store backed by a fjall partition. Entries are stored as
/// JSON under the pair key, e.g. `USD_GBP`.
pub struct DiskRateStore {
    _keyspace: Keyspace,
    partition: PartitionHandle,
    // Serializes read-modify-write sequences (evict, clear)
    write_lock: Mutex<()>,
}

impl DiskRateStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let keyspace = fjall::Config::new(path).open()?;
        let partition =
            keyspace.open_partition(RATES_PARTITION, PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: keyspace,
            partition,
            write_lock: Mutex::new(()),
        })
    }

    fn read(&self, pair: &CurrencyPair) -> Result<Option<CachedRate>> {
        match self.partition.get(pair.key())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RateStore for DiskRateStore {
    async fn get(&self, pair: &CurrencyPair) -> Option<CachedRate> {
        match self.read(pair) {
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                debug!("Cache MISS for key: {}", pair.key());
                None
            }
            Err(e) => {
                debug!("DiskRateStore get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, rate: CachedRate) {
        let _guard = self.write_lock.lock().await;
        let res: Result<()> = (|| {
            self.partition
                .insert(rate.pair.key().into_bytes(), serde_json::to_vec(&rate)?)?;
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskRateStore put error: {}", e);
        }
    }

    async fn evict(&self, entry: &CachedRate) {
        let _guard = self.write_lock.lock().await;
        let res: Result<()> = (|| {
            if self.read(&entry.pair)?.as_ref() == Some(entry) {
                self.partition.remove(entry.pair.key().into_bytes())?;
                debug!("Cache REMOVE for key: {}", entry.pair.key());
            }
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskRateStore evict error: {}", e);
        }
    }

    async fn clear(&self) {
        let _guard = self.write_lock.lock().await;
        let res: Result<()> = (|| {
            let keys = self
                .partition
                .keys()
                .collect::<std::result::Result<Vec<_>, _>>()?;
            for key in keys {
                self.partition.remove(key)?;
            }
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskRateStore clear error: {}", e);
        }
    }

    async fn list(&self) -> Vec<CachedRate> {
        self.partition
            .iter()
            .filter_map(|item| match item {
                Ok((_, value)) => serde_json::from_slice(&value).ok(),
                Err(e) => {
                    debug!("DiskRateStore list error: {}", e);
                    None
                }
            })
            .collect()
    }
}

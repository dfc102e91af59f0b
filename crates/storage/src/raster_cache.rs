//! In-memory LRU cache of raster bytes in front of the raster host.

use bytes::Bytes;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StorageResult;
use crate::RasterStore;

/// In-memory LRU cache of raster files.
///
/// A chart request samples seven daily rasters at once and map clicks tend to
/// hit the same day repeatedly, so whole files are kept keyed by name.
/// National 3km rasters are a few hundred KB each.
pub struct RasterCache {
    /// name -> raster bytes
    cache: Arc<Mutex<LruCache<String, Bytes>>>,
    store: Arc<RasterStore>,
    stats: Arc<Mutex<CacheStats>>,
    capacity: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub total_bytes_cached: u64,
}

impl CacheStats {
    /// Hit rate in percent.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Whether a `get` was served from memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

impl RasterCache {
    /// Create a cache holding at most `capacity` rasters (at least one).
    pub fn new(capacity: usize, store: Arc<RasterStore>) -> Self {
        let capacity = capacity.max(1);
        let cache_size = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Arc::new(Mutex::new(LruCache::new(cache_size))),
            store,
            stats: Arc::new(Mutex::new(CacheStats::default())),
            capacity,
        }
    }

    /// Raster bytes from memory, or from the host on a miss.
    ///
    /// Failed fetches are not cached.
    pub async fn get(&self, name: &str) -> StorageResult<Bytes> {
        self.get_with_outcome(name).await.map(|(data, _)| data)
    }

    /// Like [`get`](Self::get), also reporting whether it was a hit.
    pub async fn get_with_outcome(&self, name: &str) -> StorageResult<(Bytes, CacheOutcome)> {
        {
            let mut cache = self.cache.lock().await;
            if let Some(data) = cache.get(name) {
                self.stats.lock().await.hits += 1;
                return Ok((data.clone(), CacheOutcome::Hit));
            }
        }

        let data = self.store.get(name).await?;
        self.stats.lock().await.misses += 1;

        {
            let mut cache = self.cache.lock().await;
            let data_size = data.len() as u64;

            let evicted = cache.push(name.to_string(), data.clone());
            let mut stats = self.stats.lock().await;
            if let Some((evicted_name, evicted_data)) = evicted {
                // push returns the old value when the key was already present
                if evicted_name != name {
                    stats.evictions += 1;
                    debug!(raster = %evicted_name, "Evicted raster from cache");
                }
                stats.total_bytes_cached = stats
                    .total_bytes_cached
                    .saturating_sub(evicted_data.len() as u64);
            }
            stats.total_bytes_cached += data_size;
        }

        Ok((data, CacheOutcome::Miss))
    }

    /// Get current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.stats.lock().await.clone()
    }

    /// Get current cache size (number of entries).
    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The underlying raster host.
    pub fn store(&self) -> &Arc<RasterStore> {
        &self.store
    }
}

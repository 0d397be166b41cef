//! Asset cache: three-tier lookup for remote PDF bytes.
//!
//! DESIGN
//! ======
//! `get(url)` walks memory, then the persistent store, then the network; the first
//! tier that answers wins. A persistent hit is checked against the TTL (expired
//! entries are deleted and treated as misses) and promoted into memory. A network
//! result is written to both tiers before it is returned.
//!
//! Concurrent `get`s for the same URL that miss memory are single-flighted: they
//! serialize on a per-URL async lock, and every waiter re-checks memory once the
//! holder finishes, so one cold URL costs one network fetch.
//!
//! ERROR HANDLING
//! ==============
//! Persistent-tier failures are logged, counted, and treated as misses. Only a
//! network failure with no cached copy reaches the caller, as [`CacheError::Fetch`].

pub mod fetch;
pub mod memory;
pub mod stats;
pub mod store;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;

pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use memory::MemoryTier;
pub use stats::CacheStats;
pub use store::{FileStore, PersistentStore, StoreError};

use stats::Counters;

// =============================================================================
// TYPES
// =============================================================================

/// One cached asset. Superseded, never mutated, when the same URL is fetched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub bytes: Bytes,
    pub source_url: String,
    pub stored_at_epoch_ms: i64,
    pub size_bytes: usize,
}

impl CacheEntry {
    #[must_use]
    pub fn new(url: &str, bytes: Bytes, stored_at_epoch_ms: i64) -> Self {
        let size_bytes = bytes.len();
        Self { bytes, source_url: url.to_string(), stored_at_epoch_ms, size_bytes }
    }

    /// True once strictly more than `ttl` has elapsed since the entry was stored.
    #[must_use]
    pub fn is_expired(&self, now_epoch_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_epoch_ms.saturating_sub(self.stored_at_epoch_ms) > ttl_ms
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}

impl CacheError {
    /// Whether the caller should offer a retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch { source, .. } => source.is_retryable(),
        }
    }
}

// =============================================================================
// CACHE
// =============================================================================

/// Explicitly constructed cache service. Share it behind an `Arc`.
pub struct AssetCache {
    config: CacheConfig,
    memory: Mutex<MemoryTier>,
    store: Arc<dyn PersistentStore>,
    fetcher: Arc<dyn Fetcher>,
    inflight: Arc<InflightMap>,
    counters: Counters,
}

type InflightMap = std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>;

impl AssetCache {
    #[must_use]
    pub fn new(config: CacheConfig, store: Arc<dyn PersistentStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        let memory = Mutex::new(MemoryTier::new(config.capacity));
        Self { config, memory, store, fetcher, inflight: Arc::default(), counters: Counters::default() }
    }

    /// Bytes for `url`, from the fastest tier that has them.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Fetch`] when no tier has the asset and the network fetch
    /// fails.
    pub async fn get(&self, url: &str) -> Result<Bytes, CacheError> {
        self.get_at(url, now_epoch_ms()).await
    }

    pub(crate) async fn get_at(&self, url: &str, now_epoch_ms: i64) -> Result<Bytes, CacheError> {
        Counters::bump(&self.counters.requests);
        if let Some(bytes) = self.memory_hit(url).await {
            return Ok(bytes);
        }

        let flight = FlightGuard::join(&self.inflight, url);
        let _turn = flight.turn().await;
        self.load_slow(url, now_epoch_ms).await
    }

    /// Drop `url` from both tiers. Returns whether memory held it.
    pub async fn invalidate(&self, url: &str) -> bool {
        let removed = self.memory.lock().await.remove(url);
        if let Err(e) = self.store.delete(&self.store_key(url)).await {
            self.soft_store_error("delete", url, &e);
        }
        debug!(url = %url, removed, "cache entry invalidated");
        removed
    }

    /// Release every memory-tier handle. The persistent tier is untouched.
    pub async fn clear_memory(&self) {
        self.memory.lock().await.clear();
    }

    /// Whether `url` is currently resident in memory. Does not affect recency.
    pub async fn is_resident(&self, url: &str) -> bool {
        self.memory.lock().await.contains(url)
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // --- Tiers ---

    async fn memory_hit(&self, url: &str) -> Option<Bytes> {
        let entry = self.memory.lock().await.get(url)?;
        Counters::bump(&self.counters.memory_hits);
        debug!(url = %url, "memory hit");
        Some(entry.bytes)
    }

    async fn load_slow(&self, url: &str, now_epoch_ms: i64) -> Result<Bytes, CacheError> {
        if let Some(bytes) = self.memory_hit(url).await {
            return Ok(bytes);
        }

        let key = self.store_key(url);
        if let Some(entry) = self.persistent_hit(&key, url, now_epoch_ms).await {
            let bytes = entry.bytes.clone();
            self.remember(url, entry).await;
            return Ok(bytes);
        }

        Counters::bump(&self.counters.network_fetches);
        let bytes = match self.fetcher.fetch(url).await {
            Ok(bytes) => bytes,
            Err(source) => {
                Counters::bump(&self.counters.network_failures);
                warn!(url = %url, error = %source, "network fetch failed");
                return Err(CacheError::Fetch { url: url.to_string(), source });
            }
        };
        info!(url = %url, size = bytes.len(), "fetched from network");

        let entry = CacheEntry::new(url, bytes.clone(), now_epoch_ms);
        if let Err(e) = self.store.write(&key, &entry).await {
            self.soft_store_error("write", url, &e);
        }
        self.remember(url, entry).await;
        Ok(bytes)
    }

    async fn persistent_hit(&self, key: &str, url: &str, now_epoch_ms: i64) -> Option<CacheEntry> {
        match self.store.read(key).await {
            Ok(Some(entry)) if entry.is_expired(now_epoch_ms, self.config.ttl) => {
                debug!(url = %url, stored_at = entry.stored_at_epoch_ms, "persistent entry expired");
                if let Err(e) = self.store.delete(key).await {
                    self.soft_store_error("delete", url, &e);
                }
                None
            }
            Ok(Some(entry)) => {
                Counters::bump(&self.counters.persistent_hits);
                debug!(url = %url, "persistent hit; promoting");
                Some(entry)
            }
            Ok(None) => None,
            Err(e) => {
                self.soft_store_error("read", url, &e);
                None
            }
        }
    }

    async fn remember(&self, url: &str, entry: CacheEntry) {
        if let Some(evicted) = self.memory.lock().await.put(url, entry) {
            Counters::bump(&self.counters.evictions);
            debug!(url = %evicted, "evicted from memory");
        }
    }

    fn soft_store_error(&self, op: &'static str, url: &str, error: &StoreError) {
        Counters::bump(&self.counters.persistent_errors);
        warn!(url = %url, op, error = %error, "persistent tier error; treating as miss");
    }

    fn store_key(&self, url: &str) -> String {
        format!("{}:{url}", self.config.namespace)
    }

    #[cfg(test)]
    fn inflight_len(&self) -> usize {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

// =============================================================================
// SINGLE FLIGHT
// =============================================================================

/// One caller's membership in a URL's flight.
///
/// Leaving happens in `Drop`, so a `get` future discarded mid-fetch still releases
/// its slot. The map lock is synchronous and never held across an await.
struct FlightGuard {
    inflight: Arc<InflightMap>,
    url: String,
    flight: Option<Arc<Mutex<()>>>,
}

impl FlightGuard {
    fn join(inflight: &Arc<InflightMap>, url: &str) -> Self {
        let flight = {
            let mut map = inflight.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(url.to_string()).or_default())
        };
        Self { inflight: Arc::clone(inflight), url: url.to_string(), flight: Some(flight) }
    }

    /// Wait for this URL's turn. The flight handle is only vacated in `Drop`.
    async fn turn(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.flight {
            Some(flight) => Some(flight.lock().await),
            None => None,
        }
    }
}

impl Drop for FlightGuard {
    // Handles are cloned and dropped under the map lock, so a count of one means
    // nobody else is queued on this URL.
    fn drop(&mut self) {
        let mut map = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        drop(self.flight.take());
        if map.get(&self.url).is_some_and(|f| Arc::strong_count(f) == 1) {
            map.remove(&self.url);
        }
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

//! Cache counters and the read-only snapshot exposed to callers.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time view of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Every `get` call.
    pub requests: u64,
    /// Served from the memory tier.
    pub memory_hits: u64,
    /// Served from the persistent tier (and promoted).
    pub persistent_hits: u64,
    /// Network fetch attempts, successful or not.
    pub network_fetches: u64,
    /// Network fetch attempts that failed.
    pub network_failures: u64,
    /// Persistent-tier reads, writes, or deletes that failed and were absorbed.
    pub persistent_errors: u64,
    /// Entries pushed out of the memory tier by capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Share of requests answered without touching the network, in `[0, 1]`.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = (self.memory_hits + self.persistent_hits) as f64 / self.requests as f64;
        rate
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub requests: AtomicU64,
    pub memory_hits: AtomicU64,
    pub persistent_hits: AtomicU64,
    pub network_fetches: AtomicU64,
    pub network_failures: AtomicU64,
    pub persistent_errors: AtomicU64,
    pub evictions: AtomicU64,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CacheStats {
            requests: load(&self.requests),
            memory_hits: load(&self.memory_hits),
            persistent_hits: load(&self.persistent_hits),
            network_fetches: load(&self.network_fetches),
            network_failures: load(&self.network_failures),
            persistent_errors: load(&self.persistent_errors),
            evictions: load(&self.evictions),
        }
    }
}

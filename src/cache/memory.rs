//! Bounded in-process tier.
//!
//! Both `get` and `put` refresh an entry's recency. When a new URL arrives at
//! capacity, the least recently touched entry is dropped and reported back so the
//! caller can count it.

use std::num::NonZeroUsize;

use lru::LruCache;

use super::CacheEntry;

pub struct MemoryTier {
    entries: LruCache<String, CacheEntry>,
}

impl MemoryTier {
    /// A tier holding at most `capacity` entries. Zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { entries: LruCache::new(capacity) }
    }

    /// Look up `url` and mark it most recently used.
    pub fn get(&mut self, url: &str) -> Option<CacheEntry> {
        self.entries.get(url).cloned()
    }

    /// Insert or replace `url`. Returns the URL that was evicted to make room, if any.
    pub fn put(&mut self, url: &str, entry: CacheEntry) -> Option<String> {
        match self.entries.push(url.to_string(), entry) {
            Some((evicted, _)) if evicted != url => Some(evicted),
            _ => None,
        }
    }

    pub fn remove(&mut self, url: &str) -> bool {
        self.entries.pop(url).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether `url` is resident. Does not touch recency.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

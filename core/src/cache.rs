//! Time-bounded memoization of loaded packages.
//!
//! Entries expire lazily: expiry is only ever detected during a read, which
//! removes the stale entry and reports a miss. There is no background
//! eviction, so the cache carries no concurrency concerns of its own.

use crate::types::ThemePackage;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    package: ThemePackage,
    loaded_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(package: ThemePackage, ttl: Duration) -> Self {
        CacheEntry {
            package,
            loaded_at: Instant::now(),
            ttl,
        }
    }

    /// An entry is expired once its age reaches the TTL (`age >= ttl`).
    fn is_expired(&self) -> bool {
        self.loaded_at.elapsed() >= self.ttl
    }

    fn age(&self) -> Duration {
        self.loaded_at.elapsed()
    }
}

/// Read-only snapshot of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntrySnapshot {
    pub id: String,
    pub age: Duration,
    pub ttl: Duration,
}

/// Read-only snapshot of the whole cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStatus {
    pub size: usize,
    pub entries: Vec<CacheEntrySnapshot>,
}

/// TTL cache keyed by package id.
///
/// Owned exclusively by the manager; entries never leave as references,
/// only as cloned packages or as [`CacheStatus`] snapshots.
#[derive(Debug)]
pub struct PackageCache {
    entries: HashMap<String, CacheEntry>,
    default_ttl: Duration,
}

impl PackageCache {
    pub fn new(default_ttl: Duration) -> Self {
        PackageCache {
            entries: HashMap::new(),
            default_ttl,
        }
    }

    /// Cache probe. Hit only; never triggers a load.
    ///
    /// Finding an expired entry removes it and returns `None`, forcing the
    /// caller to reload.
    pub fn get(&mut self, id: &str) -> Option<ThemePackage> {
        match self.entries.get(id) {
            Some(entry) if entry.is_expired() => {
                log::debug!("Cache entry expired for package '{id}'");
                self.entries.remove(id);
                None
            }
            Some(entry) => Some(entry.package.clone()),
            None => None,
        }
    }

    /// Stores a package. `ttl = None` applies the default TTL.
    pub fn set(&mut self, id: impl Into<String>, package: ThemePackage, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(id.into(), CacheEntry::new(package, ttl));
    }

    /// Drops one entry. Returns whether an entry was present.
    pub fn invalidate(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        if dropped > 0 {
            log::debug!("Cleared {dropped} cached package(s)");
        }
    }

    /// Snapshot of the live entries, sorted by id.
    ///
    /// Expired entries found while taking the snapshot are evicted, same as
    /// on any other read.
    pub fn status(&mut self) -> CacheStatus {
        self.entries.retain(|id, entry| {
            let keep = !entry.is_expired();
            if !keep {
                log::debug!("Cache entry expired for package '{id}'");
            }
            keep
        });

        let mut entries: Vec<CacheEntrySnapshot> = self
            .entries
            .iter()
            .map(|(id, entry)| CacheEntrySnapshot {
                id: id.clone(),
                age: entry.age(),
                ttl: entry.ttl,
            })
            .collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));

        CacheStatus {
            size: entries.len(),
            entries,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Changes the default TTL for entries stored from now on; existing
    /// entries keep the TTL they were stored with.
    pub fn set_default_ttl(&mut self, ttl: Duration) {
        self.default_ttl = ttl;
    }
}

impl Default for PackageCache {
    fn default() -> Self {
        // Matches ThemeOptions::cache_timeout()
        PackageCache::new(Duration::from_millis(300_000))
    }
}

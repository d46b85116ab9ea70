use crate::domain::model::RankedResultSet;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// A ranked result set and when it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub results: RankedResultSet,
    pub inserted_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

/// In-memory result cache with a fixed time-to-live.
///
/// Expiry is lazy: a stale entry reads as a miss and stays in the map
/// until it is overwritten or [`ResultCache::purge_expired`] runs.
/// Reads and writes go through `DashMap` shards, so concurrent `compare`
/// calls never see a torn entry; two writers on one key simply race and
/// the last one wins.
#[derive(Debug)]
pub struct ResultCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<RankedResultSet> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(self.ttl, Instant::now()) {
            Some(entry.results.clone())
        } else {
            tracing::debug!("Cache entry expired for key {:?}", key);
            None
        }
    }

    pub fn put(&self, key: String, results: RankedResultSet) {
        self.entries.insert(
            key,
            CacheEntry {
                results,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drops stale entries and returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(self.ttl, now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!("Purged {} expired cache entries", removed);
        }
        removed
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

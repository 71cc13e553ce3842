//------------ Result Cache (C8) -----------------------------------------------
//!
//! Short-TTL memoization of final ranked results per prefix, keyed by
//! normalized prefix and an optional coarse user bucket (§4.8). Backed
//! by a concurrent hash map so lookups from many query threads never
//! block each other (§5 "protected by per-shard striped locking or a
//! concurrent hash map").

use dashmap::DashMap;

use crate::phrase::{CacheEntry, CacheKey, ScoredSuggestion, TimestampMs};

pub struct ResultCache {
    ttl_ms: i64,
    max_entries: usize,
    entries: DashMap<CacheKey, CacheEntry>,
}

impl ResultCache {
    pub fn new(ttl_ms: i64, max_entries: usize) -> Self {
        Self { ttl_ms, max_entries, entries: DashMap::new() }
    }

    /// §4.8: returns the cached suggestions for `key` if present and not
    /// expired as of `now_ms`. An expired entry is removed so later
    /// lookups don't keep paying the hash lookup for dead data.
    pub fn get(&self, key: &CacheKey, now_ms: TimestampMs) -> Option<Vec<ScoredSuggestion>> {
        let hit = self.entries.get(key)?;
        if now_ms - hit.created_at_ms > self.ttl_ms {
            drop(hit);
            self.entries.remove(key);
            return None;
        }
        Some(hit.suggestions.clone())
    }

    /// §4.8: best-effort, fire-and-forget store (§5). If at capacity,
    /// evicts the entry with the oldest `created_at_ms` as an
    /// approximation of LRU — a full access-order LRU would need an
    /// auxiliary ordered structure; for a 60s-TTL cache this
    /// insertion-recency proxy is close enough and avoids adding a
    /// second lock around every `get`.
    pub fn put(&self, key: CacheKey, suggestions: Vec<ScoredSuggestion>, now_ms: TimestampMs) {
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            if let Some(oldest_key) = self
                .entries
                .iter()
                .min_by_key(|e| e.value().created_at_ms)
                .map(|e| e.key().clone())
            {
                self.entries.remove(&oldest_key);
            }
        }
        self.entries.insert(key, CacheEntry { suggestions, created_at_ms: now_ms });
    }

    /// §4.9 / C9: clears the entire cache, used on operator rebuild.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// §4.8: removes all entries whose prefix starts with `prefix`,
    /// used when a per-shard apply makes a conservative invalidation
    /// cheaper than tracking exactly which cached prefixes it touched.
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.entries.retain(|key, _| !key.prefix.starts_with(prefix));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hashes a user id into one of `buckets` coarse cache partitions
/// (§4.8's resolved open question: personalization still participates
/// in the cache, just at a coarser key granularity).
pub fn user_bucket(user_id: &str, buckets: u32) -> u32 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    user_id.hash(&mut hasher);
    (hasher.finish() % buckets as u64) as u32
}

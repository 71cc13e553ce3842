//------------ Trending Counter (C4) ------------------------------------------
//!
//! Sliding-window popularity counters with time-bucketed decay,
//! implemented as a ring of fixed-size buckets indexed by
//! `bucket_id mod window_buckets`. "Expiry" of an old bucket is
//! overwriting on next use, not an explicit delete pass, per the
//! design note in §9.

use parking_lot::Mutex;
use std::collections::HashMap;

use crate::phrase::TimestampMs;

struct BucketData {
    /// The bucket id this slot currently represents, or `None` if the
    /// slot has never been written.
    bucket_id: Option<i64>,
    counts: HashMap<String, u64>,
}

/// A ring of time buckets tracking recent per-phrase activity.
pub struct TrendingCounter {
    bucket_ms: i64,
    window_buckets: usize,
    slots: Vec<Mutex<BucketData>>,
}

impl TrendingCounter {
    pub fn new(bucket_ms: i64, window_buckets: usize) -> Self {
        let slots = (0..window_buckets)
            .map(|_| Mutex::new(BucketData { bucket_id: None, counts: HashMap::new() }))
            .collect();
        Self { bucket_ms, window_buckets, slots }
    }

    fn bucket_id_for(&self, timestamp_ms: TimestampMs) -> i64 {
        timestamp_ms.div_euclid(self.bucket_ms)
    }

    fn slot_index(&self, bucket_id: i64) -> usize {
        bucket_id.rem_euclid(self.window_buckets as i64) as usize
    }

    /// §4.4: increments the bucket that covers `timestamp`. If the slot
    /// currently holds a stale (older) bucket id, it is overwritten
    /// (its previous counts discarded) rather than merged.
    pub fn record(&self, phrase: &str, timestamp_ms: TimestampMs) {
        let bucket_id = self.bucket_id_for(timestamp_ms);
        let idx = self.slot_index(bucket_id);
        let mut slot = self.slots[idx].lock();
        if slot.bucket_id != Some(bucket_id) {
            slot.bucket_id = Some(bucket_id);
            slot.counts.clear();
        }
        *slot.counts.entry(phrase.to_string()).or_insert(0) += 1;
    }

    /// §4.4: sum of counts for `phrase` across the active window ending
    /// at `now_ms`. A slot whose stored bucket id falls outside the
    /// active window is skipped even if it hasn't been physically
    /// cleared yet.
    pub fn score_at(&self, phrase: &str, now_ms: TimestampMs) -> u64 {
        let current_bucket = self.bucket_id_for(now_ms);
        let oldest_active = current_bucket - self.window_buckets as i64 + 1;
        let mut total = 0u64;
        for slot in &self.slots {
            let guard = slot.lock();
            if let Some(id) = guard.bucket_id {
                if id >= oldest_active && id <= current_bucket {
                    total += guard.counts.get(phrase).copied().unwrap_or(0);
                }
            }
        }
        total
    }

    pub fn window_ms(&self) -> i64 {
        self.bucket_ms * self.window_buckets as i64
    }

    /// §4.4/§4.9: the N currently-trending phrases, discovered from the
    /// active window rather than supplied by the caller. Merges every
    /// slot whose stored bucket id is still in the active window, sums
    /// counts per phrase, then sorts by (count desc, phrase asc).
    pub fn top_n(&self, now_ms: TimestampMs, n: usize) -> Vec<(String, u64)> {
        let current_bucket = self.bucket_id_for(now_ms);
        let oldest_active = current_bucket - self.window_buckets as i64 + 1;
        let mut merged: HashMap<String, u64> = HashMap::new();
        for slot in &self.slots {
            let guard = slot.lock();
            if let Some(id) = guard.bucket_id {
                if id >= oldest_active && id <= current_bucket {
                    for (phrase, count) in &guard.counts {
                        *merged.entry(phrase.clone()).or_insert(0) += count;
                    }
                }
            }
        }
        let mut scored: Vec<(String, u64)> = merged.into_iter().collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(n);
        scored
    }
}

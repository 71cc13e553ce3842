//------------ Aggregation Pipeline (C6) ---------------------------------------
//!
//! Event intake, quality filter, batching and shard-update dispatch.
//! Trending and personalization are updated inline on accept (§4.6 step
//! 4/5); the delta map is batched and flushed periodically (step 1-3).
//! The caller drives the flush cadence (`flush_interval_ms` is a config
//! value, not a timer the core spawns — generic scheduling is out of
//! scope, §1).
//!
//! Without the `parallel` feature, step 3's per-shard dispatch still
//! runs off the calling thread: a small pool of `std::thread` workers
//! reads shard groups off a bounded `crossbeam_channel`, per §5's
//! threading model ("plain `std::thread` workers coordinated with
//! `crossbeam_channel` bounded channels, not `tokio` tasks").

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use parking_lot::Mutex;

use crate::aggregation::filter;
use crate::errors::{IngestError, RejectReason};
use crate::personalization::PersonalizationStore;
use crate::phrase::TimestampMs;
use crate::router;
use crate::trending::TrendingCounter;
use crate::trie::Shard;

struct PendingDeltas {
    deltas: HashMap<String, i64>,
    /// Tracks first-seen order so the soft-cap eviction in
    /// `record_delta` can drop the oldest phrase, not an arbitrary one.
    order: VecDeque<String>,
}

impl PendingDeltas {
    fn new() -> Self {
        Self { deltas: HashMap::new(), order: VecDeque::new() }
    }
}

/// Counters for each quality-filter rejection reason, exposed to the
/// admin control plane (C9) as metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectCounts {
    pub too_short: u64,
    pub too_long: u64,
    pub only_digits: u64,
    pub keyboard_smash: u64,
    pub empty_after_normalize: u64,
}

struct AtomicRejectCounts {
    too_short: AtomicU64,
    too_long: AtomicU64,
    only_digits: AtomicU64,
    keyboard_smash: AtomicU64,
    empty_after_normalize: AtomicU64,
}

impl AtomicRejectCounts {
    fn new() -> Self {
        Self {
            too_short: AtomicU64::new(0),
            too_long: AtomicU64::new(0),
            only_digits: AtomicU64::new(0),
            keyboard_smash: AtomicU64::new(0),
            empty_after_normalize: AtomicU64::new(0),
        }
    }

    fn record(&self, reason: RejectReason) {
        let counter = match reason {
            RejectReason::TooShort => &self.too_short,
            RejectReason::TooLong => &self.too_long,
            RejectReason::OnlyDigits => &self.only_digits,
            RejectReason::KeyboardSmash => &self.keyboard_smash,
            RejectReason::EmptyAfterNormalize => &self.empty_after_normalize,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> RejectCounts {
        RejectCounts {
            too_short: self.too_short.load(Ordering::Relaxed),
            too_long: self.too_long.load(Ordering::Relaxed),
            only_digits: self.only_digits.load(Ordering::Relaxed),
            keyboard_smash: self.keyboard_smash.load(Ordering::Relaxed),
            empty_after_normalize: self.empty_after_normalize.load(Ordering::Relaxed),
        }
    }
}

/// The aggregation pipeline: intake, filter, batch, dispatch.
pub struct AggregationPipeline {
    shards: Vec<Arc<Shard>>,
    trending: Arc<TrendingCounter>,
    personalization: Arc<PersonalizationStore>,
    pending: Mutex<PendingDeltas>,
    soft_cap: usize,
    reject_counts: AtomicRejectCounts,
    backpressure_dropped: AtomicU64,
    max_dispatch_retries: u32,
}

impl AggregationPipeline {
    pub fn new(
        shards: Vec<Arc<Shard>>,
        trending: Arc<TrendingCounter>,
        personalization: Arc<PersonalizationStore>,
        soft_cap: usize,
    ) -> Self {
        Self {
            shards,
            trending,
            personalization,
            pending: Mutex::new(PendingDeltas::new()),
            soft_cap,
            reject_counts: AtomicRejectCounts::new(),
            backpressure_dropped: AtomicU64::new(0),
            max_dispatch_retries: 3,
        }
    }

    /// §4.6: filters, then (on accept) updates trending inline,
    /// updates personalization inline if a user id is present, and
    /// records a delta for the next flush. Rejections never propagate
    /// past this call; they are counted and the event is dropped.
    pub fn submit_event(
        &self,
        phrase: &str,
        timestamp_ms: TimestampMs,
        user_id: Option<&str>,
    ) -> Result<(), IngestError> {
        let normalized = match filter::check(phrase) {
            Ok(normalized) => normalized,
            Err(reason) => {
                self.reject_counts.record(reason);
                log::debug!("rejected event phrase={phrase:?} reason={reason}");
                return Err(IngestError::Rejected(reason));
            }
        };

        self.trending.record(&normalized, timestamp_ms);
        if let Some(user_id) = user_id {
            self.personalization.record_query(user_id, &normalized, timestamp_ms);
        }
        self.record_delta(normalized);
        Ok(())
    }

    fn record_delta(&self, phrase: String) {
        let mut pending = self.pending.lock();
        if !pending.deltas.contains_key(&phrase) {
            pending.order.push_back(phrase.clone());
        }
        *pending.deltas.entry(phrase).or_insert(0) += 1;

        while pending.deltas.len() > self.soft_cap {
            if let Some(oldest) = pending.order.pop_front() {
                pending.deltas.remove(&oldest);
                self.backpressure_dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("delta map soft cap exceeded, dropped phrase={oldest:?}");
            } else {
                break;
            }
        }
    }

    /// §4.6 steps 1-3: atomically drains the delta map, groups by
    /// shard, and dispatches `apply_delta` to each shard. With the
    /// `parallel` feature, shard groups are dispatched via `rayon`;
    /// otherwise sequentially. Per-phrase deltas are pre-summed by
    /// `record_delta`'s accumulation, so within this flush each shard
    /// sees one combined delta per phrase; across flushes, later
    /// deltas are dispatched after this flush's, preserving order.
    pub fn flush(&self, now_ms: TimestampMs) {
        let drained = {
            let mut pending = self.pending.lock();
            std::mem::replace(&mut *pending, PendingDeltas::new())
        };
        if drained.deltas.is_empty() {
            return;
        }
        log::debug!("pipeline flush starting: {} pending deltas", drained.deltas.len());

        let shard_count = self.shards.len() as u32;
        let mut groups: HashMap<u32, Vec<(String, i64)>> = HashMap::new();
        for (phrase, delta) in drained.deltas {
            if let Some(shard_id) = router::broadcast_write(&phrase, shard_count) {
                groups.entry(shard_id).or_default().push((phrase, delta));
            }
        }

        let dispatch_one = |shard_id: u32, entries: &[(String, i64)]| {
            let shard = &self.shards[shard_id as usize];
            for (phrase, delta) in entries {
                let ok = retry_with_backoff(
                    || {
                        shard.apply_delta(phrase, *delta, now_ms);
                        true
                    },
                    self.max_dispatch_retries,
                );
                if !ok {
                    log::error!("shard {shard_id} dispatch exhausted retries for {phrase:?}");
                }
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            groups.par_iter().for_each(|(shard_id, entries)| dispatch_one(*shard_id, entries));
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.dispatch_sequential(groups, dispatch_one);
        }
        log::debug!("pipeline flush finished");
    }

    /// Fans `groups` out to a bounded pool of worker threads via a
    /// `crossbeam_channel`, then blocks until every group has been
    /// dispatched. Used when the `parallel` (rayon) feature is off.
    #[cfg(not(feature = "parallel"))]
    fn dispatch_sequential(
        &self,
        groups: HashMap<u32, Vec<(String, i64)>>,
        dispatch_one: impl Fn(u32, &[(String, i64)]) + Sync,
    ) {
        let worker_count = groups.len().clamp(1, 4);
        let (tx, rx) = bounded::<(u32, Vec<(String, i64)>)>(groups.len());
        for (shard_id, entries) in groups {
            tx.send((shard_id, entries)).expect("channel outlives all senders in this scope");
        }
        drop(tx);

        thread::scope(|scope| {
            for _ in 0..worker_count {
                let rx = rx.clone();
                let dispatch_one = &dispatch_one;
                scope.spawn(move || {
                    while let Ok((shard_id, entries)) = rx.recv() {
                        dispatch_one(shard_id, &entries);
                    }
                });
            }
        });
    }

    pub fn reject_counts(&self) -> RejectCounts {
        self.reject_counts.snapshot()
    }

    pub fn backpressure_dropped(&self) -> u64 {
        self.backpressure_dropped.load(Ordering::Relaxed)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().deltas.len()
    }
}

/// Bounded exponential backoff retry, used for per-shard dispatch
/// (§4.6 "per-shard dispatch errors are retried with bounded
/// exponential backoff; after retry exhaustion the batch is ... dropped").
/// Returns `true` once `f` succeeds, `false` once retries are exhausted.
fn retry_with_backoff<F: FnMut() -> bool>(mut f: F, max_retries: u32) -> bool {
    let mut attempt = 0;
    loop {
        if f() {
            return true;
        }
        if attempt >= max_retries {
            return false;
        }
        let backoff_ms = 10u64 << attempt;
        thread::sleep(Duration::from_millis(backoff_ms));
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(shard_count: u32) -> AggregationPipeline {
        let shards = (0..shard_count).map(|i| Arc::new(Shard::new(i, 10))).collect();
        let trending = Arc::new(TrendingCounter::new(5 * 60 * 1000, 12));
        let personalization = Arc::new(PersonalizationStore::new(200));
        AggregationPipeline::new(shards, trending, personalization, 1_000_000)
    }

    #[test]
    fn s5_quality_filter_rejects_keyboard_smash_events() {
        let pipeline = pipeline(4);
        for _ in 0..1000 {
            let _ = pipeline.submit_event("aaaaaaaaaa", 0, None);
        }
        assert_eq!(pipeline.reject_counts().keyboard_smash, 1000);
        assert_eq!(pipeline.pending_count(), 0);
    }

    #[test]
    fn flush_dispatches_combined_deltas_to_shards() {
        let pipeline = pipeline(1);
        pipeline.shards[0].rebuild_from(&[]);
        for _ in 0..3 {
            pipeline.submit_event("apple", 0, None).unwrap();
        }
        assert_eq!(pipeline.pending_count(), 1);
        pipeline.flush(0);
        assert_eq!(pipeline.pending_count(), 0);
    }

    #[test]
    fn soft_cap_evicts_oldest_pending_phrase() {
        let pipeline = {
            let shards = vec![Arc::new(Shard::new(0, 10))];
            let trending = Arc::new(TrendingCounter::new(5 * 60 * 1000, 12));
            let personalization = Arc::new(PersonalizationStore::new(200));
            AggregationPipeline::new(shards, trending, personalization, 2)
        };
        pipeline.submit_event("alpha", 0, None).unwrap();
        pipeline.submit_event("bravo", 0, None).unwrap();
        pipeline.submit_event("charlie", 0, None).unwrap();
        assert_eq!(pipeline.pending_count(), 2);
        assert_eq!(pipeline.backpressure_dropped(), 1);
    }

    #[test]
    fn retry_with_backoff_gives_up_after_max_retries() {
        let mut calls = 0;
        let ok = retry_with_backoff(
            || {
                calls += 1;
                false
            },
            2,
        );
        assert!(!ok);
        assert_eq!(calls, 3);
    }

    #[test]
    fn retry_with_backoff_succeeds_eventually() {
        let mut calls = 0;
        let ok = retry_with_backoff(
            || {
                calls += 1;
                calls >= 2
            },
            5,
        );
        assert!(ok);
        assert_eq!(calls, 2);
    }
}

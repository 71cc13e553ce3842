//------------ Shard -----------------------------------------------------------
//!
//! One of `shard_count` independent prefix indices (C1). A shard owns a
//! published, read-only `Generation` behind an `ArcSwap` and a write-side
//! delta buffer that is consulted at lookup time so that `apply_delta`
//! effects are visible immediately (S2) without requiring a full
//! rebuild (§4.7's "pipeline's buffered apply_delta path ... does not
//! require full rebuild to reflect").
//!
//! Deltas only adjust the count of a phrase already present in a node's
//! cached top-k list: a phrase outside that cache cannot be promoted
//! into it without the node's full subtree, which the top-k cache
//! deliberately does not retain. This is a documented approximation
//! (see DESIGN.md); a full rebuild always restores the strict I-TOPK
//! invariant.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::errors::QueryError;
use crate::normalize::normalize;
use crate::phrase::{Suggestion, SnapshotRecord, TimestampMs};
use crate::trie::generation::Generation;

#[derive(Debug, Clone, Copy)]
struct PendingDelta {
    delta: i64,
    last_updated_ms: TimestampMs,
}

pub struct Shard {
    pub shard_id: u32,
    top_k: usize,
    generation: ArcSwap<Generation>,
    delta_buffer: DashMap<String, PendingDelta>,
    version_counter: AtomicU64,
}

impl Shard {
    pub fn new(shard_id: u32, top_k: usize) -> Self {
        Self {
            shard_id,
            top_k,
            generation: ArcSwap::from_pointee(Generation::empty(0)),
            delta_buffer: DashMap::new(),
            version_counter: AtomicU64::new(0),
        }
    }

    pub fn current_version(&self) -> u64 {
        self.generation.load().version
    }

    pub fn node_count(&self) -> usize {
        self.generation.load().node_count()
    }

    /// §4.1: returns the node's stored top-k suggestions with pending
    /// deltas folded in, or an empty sequence if the prefix path
    /// doesn't exist. Fails only with `PrefixInvalid`.
    pub fn lookup(&self, prefix: &str) -> Result<Vec<Suggestion>, QueryError> {
        let normalized = normalize(prefix).ok_or(QueryError::PrefixInvalid)?;
        let generation = self.generation.load_full();
        let mut suggestions: Vec<Suggestion> = generation.lookup(&normalized).to_vec();

        for suggestion in &mut suggestions {
            if let Some(pending) = self.delta_buffer.get(&suggestion.phrase) {
                suggestion.count = (suggestion.count as i64 + pending.delta).max(0) as u64;
                suggestion.last_updated_ms =
                    suggestion.last_updated_ms.max(pending.last_updated_ms);
            }
        }
        suggestions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.phrase.cmp(&b.phrase)));
        Ok(suggestions)
    }

    /// §4.1: accumulates a signed delta in the write-side buffer. Never
    /// fails; a zero delta or an unnormalizable phrase is a no-op.
    pub fn apply_delta(&self, phrase: &str, delta_count: i64, timestamp: TimestampMs) {
        if delta_count == 0 {
            return;
        }
        let Some(normalized) = normalize(phrase) else { return };
        self.delta_buffer
            .entry(normalized)
            .and_modify(|p| {
                p.delta += delta_count;
                p.last_updated_ms = timestamp;
            })
            .or_insert(PendingDelta { delta: delta_count, last_updated_ms: timestamp });
    }

    /// §4.7: replaces the read-side trie atomically via an `ArcSwap`
    /// publish. The delta buffer is cleared: the new generation is
    /// assumed to already incorporate every count it supersedes, so
    /// stale deltas must not carry over onto it.
    pub fn rebuild_from(&self, snapshot: &[SnapshotRecord]) {
        let mut owned = snapshot.to_vec();
        let new_version = self.version_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let new_generation = Generation::build_unsorted(&mut owned, self.top_k, new_version);
        self.generation.store(Arc::new(new_generation));
        self.delta_buffer.clear();
        log::debug!(
            "shard {} swapped to generation {} ({} records)",
            self.shard_id,
            new_version,
            snapshot.len()
        );
    }

    pub fn pending_delta_count(&self) -> usize {
        self.delta_buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(phrase: &str, count: u64) -> SnapshotRecord {
        SnapshotRecord { phrase: phrase.to_string(), count, last_updated_ms: 0, category: None }
    }

    #[test]
    fn s2_delta_apply_reorders() {
        let shard = Shard::new(0, 10);
        let snapshot = vec![
            rec("apple", 100),
            rec("application", 80),
            rec("apply", 60),
            rec("apricot", 40),
            rec("banana", 50),
        ];
        shard.rebuild_from(&snapshot);

        shard.apply_delta("apply", 50, 1);
        let ap: Vec<_> = shard
            .lookup("ap")
            .unwrap()
            .into_iter()
            .map(|s| (s.phrase, s.count))
            .collect();
        assert_eq!(
            ap,
            vec![
                ("apply".to_string(), 110),
                ("apple".to_string(), 100),
                ("application".to_string(), 80),
                ("apricot".to_string(), 40),
            ]
        );
    }

    #[test]
    fn empty_prefix_is_invalid() {
        let shard = Shard::new(0, 10);
        assert_eq!(shard.lookup("   ").unwrap_err(), QueryError::PrefixInvalid);
    }

    #[test]
    fn rebuild_clears_stale_deltas() {
        let shard = Shard::new(0, 10);
        shard.rebuild_from(&[rec("apple", 100)]);
        shard.apply_delta("apple", 500, 1);
        assert_eq!(shard.pending_delta_count(), 1);
        shard.rebuild_from(&[rec("apple", 100)]);
        assert_eq!(shard.pending_delta_count(), 0);
    }

    #[test]
    fn zero_delta_is_noop() {
        let shard = Shard::new(0, 10);
        shard.rebuild_from(&[rec("apple", 100)]);
        shard.apply_delta("apple", 0, 1);
        assert_eq!(shard.pending_delta_count(), 0);
    }
}

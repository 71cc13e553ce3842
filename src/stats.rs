//------------ Stats -----------------------------------------------------------
//!
//! Display-friendly counters surfaced through the admin control plane
//! (C9), mirroring the teacher's `StrideStats`/`Stats` pattern: a plain
//! struct with a `Display` impl rather than a metrics-backend client.

use std::fmt;

use crate::aggregation::RejectCounts;

/// Size and version of one shard's currently-published generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardStats {
    pub shard_id: u32,
    pub version: u64,
    pub node_count: usize,
    pub pending_deltas: usize,
}

impl fmt::Display for ShardStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "shard {:>3}: version={:<6} nodes={:<8} pending_deltas={}",
            self.shard_id, self.version, self.node_count, self.pending_deltas
        )
    }
}

/// Aggregate snapshot of the whole engine, as returned by
/// `Admin::dump_stats`.
#[derive(Debug, Clone)]
pub struct EngineStats {
    pub shards: Vec<ShardStats>,
    pub cache_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub reject_counts: RejectCounts,
    pub backpressure_dropped: u64,
    pub personalization_users: usize,
}

impl EngineStats {
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    pub fn total_nodes(&self) -> usize {
        self.shards.iter().map(|s| s.node_count).sum()
    }
}

impl fmt::Display for EngineStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "engine stats:")?;
        for shard in &self.shards {
            writeln!(f, "  {shard}")?;
        }
        writeln!(
            f,
            "  cache: entries={} hit_rate={:.3} ({} hits / {} misses)",
            self.cache_entries,
            self.cache_hit_rate(),
            self.cache_hits,
            self.cache_misses
        )?;
        writeln!(
            f,
            "  rejects: too_short={} too_long={} only_digits={} keyboard_smash={} empty={}",
            self.reject_counts.too_short,
            self.reject_counts.too_long,
            self.reject_counts.only_digits,
            self.reject_counts.keyboard_smash,
            self.reject_counts.empty_after_normalize
        )?;
        writeln!(f, "  backpressure_dropped={}", self.backpressure_dropped)?;
        write!(f, "  personalization_users={}", self.personalization_users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_zero_with_no_traffic() {
        let stats = EngineStats {
            shards: vec![],
            cache_entries: 0,
            cache_hits: 0,
            cache_misses: 0,
            reject_counts: RejectCounts::default(),
            backpressure_dropped: 0,
            personalization_users: 0,
        };
        assert_eq!(stats.cache_hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_divides_correctly() {
        let stats = EngineStats {
            shards: vec![],
            cache_entries: 0,
            cache_hits: 3,
            cache_misses: 1,
            reject_counts: RejectCounts::default(),
            backpressure_dropped: 0,
            personalization_users: 0,
        };
        assert_eq!(stats.cache_hit_rate(), 0.75);
    }
}

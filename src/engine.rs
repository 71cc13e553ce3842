//------------ Engine -----------------------------------------------------------
//!
//! Top-level wiring of C1-C9 into the one type an embedder holds: shards
//! behind a router, a ranking engine, trending/personalization signal
//! stores, a result cache, and an aggregation pipeline, mirroring how
//! the teacher's top-level store type composes its prefix trees, RIB
//! config and stats into a single handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::aggregation::AggregationPipeline;
use crate::builder::IndexBuilder;
use crate::cache::{user_bucket, ResultCache};
use crate::config::EngineConfig;
use crate::errors::{IngestError, QueryError};
use crate::personalization::PersonalizationStore;
use crate::phrase::{CacheKey, ScoredSuggestion, SnapshotRecord, TimestampMs};
use crate::ranking::{RankContext, RankingEngine};
use crate::router;
use crate::stats::{EngineStats, ShardStats};
use crate::trending::TrendingCounter;
use crate::trie::Shard;

/// The suggestion engine: owns every component and exposes the query
/// and ingestion surfaces an embedder calls (§6).
pub struct Engine {
    config: EngineConfig,
    shards: Vec<Arc<Shard>>,
    cache: ResultCache,
    trending: Arc<TrendingCounter>,
    personalization: Arc<PersonalizationStore>,
    pipeline: AggregationPipeline,
    builder: IndexBuilder,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, crate::config::ConfigError> {
        config.validate()?;

        let shards: Vec<Arc<Shard>> = (0..config.shard_count)
            .map(|id| Arc::new(Shard::new(id, config.top_k_per_node)))
            .collect();
        let trending =
            Arc::new(TrendingCounter::new(config.trending_bucket_ms, config.trending_window_buckets));
        let personalization = Arc::new(PersonalizationStore::new(config.user_history_cap));
        let cache = ResultCache::new(config.result_cache_ttl_ms, config.result_cache_max_entries);
        let pipeline = AggregationPipeline::new(
            shards.clone(),
            trending.clone(),
            personalization.clone(),
            config.delta_map_soft_cap,
        );
        let builder = IndexBuilder::new(config.shard_count);

        Ok(Self {
            config,
            shards,
            cache,
            trending,
            personalization,
            pipeline,
            builder,
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// §6: the query event sink. Never surfaces rejection reasons past
    /// a log line and a counter; see `aggregation::filter`.
    pub fn submit_event(
        &self,
        phrase: &str,
        timestamp_ms: TimestampMs,
        user_id: Option<&str>,
    ) -> Result<(), IngestError> {
        self.pipeline.submit_event(phrase, timestamp_ms, user_id)
    }

    /// Drains and dispatches the pipeline's delta map. The embedder
    /// calls this on its own schedule (`config.flush_interval_ms`); the
    /// core spawns no timer (§1, §4.5).
    pub fn flush_pipeline(&self, now_ms: TimestampMs) {
        self.pipeline.flush(now_ms);
    }

    /// The query path: C8 cache check -> C2 route -> C1 lookup -> C3
    /// rerank -> C8 store -> response.
    pub fn suggest(
        &self,
        prefix: &str,
        user_id: Option<&str>,
        limit: Option<usize>,
        now_ms: TimestampMs,
        deadline_ms: Option<u64>,
    ) -> Result<Vec<ScoredSuggestion>, QueryError> {
        let bucket = user_id.map(|id| user_bucket(id, self.config.cache_user_buckets));
        let cache_key = CacheKey { prefix: prefix.to_string(), user_bucket: bucket };

        if let Some(hit) = self.cache.get(&cache_key, now_ms) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            let limit = limit.unwrap_or(self.config.result_limit);
            let mut hit = hit;
            hit.truncate(limit);
            return Ok(hit);
        }
        self.cache_misses.fetch_add(1, Ordering::Relaxed);

        let shard_id = router::route(prefix, self.config.shard_count).ok_or(QueryError::PrefixInvalid)?;
        let shard = &self.shards[shard_id as usize];
        let candidates = shard.lookup(prefix)?;

        let deadline = deadline_ms
            .or(Some(self.config.query_deadline_ms))
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        let normalized_prefix = crate::normalize::normalize(prefix).ok_or(QueryError::PrefixInvalid)?;
        let context = RankContext { normalized_prefix: &normalized_prefix, user_id, now_ms, deadline };

        let ranking = RankingEngine::new(&self.config);
        let ranked = ranking.rank(
            &candidates,
            &context,
            &self.trending,
            Some(&self.personalization),
            limit,
        );

        self.cache.put(cache_key, ranked.clone(), now_ms);
        Ok(ranked)
    }

    /// C9: operator-initiated full rebuild from an in-memory snapshot.
    /// Invalidates the result cache afterwards, since a rebuild can
    /// change any prefix's answer.
    pub fn rebuild(&self, snapshot: &[SnapshotRecord]) -> Result<(), crate::errors::BuildError> {
        log::info!("rebuild starting: {} shards, {} records", self.shards.len(), snapshot.len());
        self.builder.rebuild_all(&self.shards, snapshot)?;
        self.cache.clear();
        log::info!("rebuild finished");
        Ok(())
    }

    pub fn rebuild_from_file(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), crate::errors::BuildError> {
        let snapshot = IndexBuilder::load_snapshot(path)?;
        self.rebuild(&snapshot)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn sweep_expired_users(&self, now_ms: TimestampMs) -> usize {
        self.personalization.sweep_expired(now_ms, self.config.user_retention_days)
    }

    /// §4.9: the N currently-trending phrases, discovered directly from
    /// the trending counter's active window.
    pub fn trending_top(&self, now_ms: TimestampMs, n: usize) -> Vec<(String, u64)> {
        self.trending.top_n(now_ms, n)
    }

    pub fn dump_stats(&self) -> EngineStats {
        let shards = self
            .shards
            .iter()
            .map(|s| ShardStats {
                shard_id: s.shard_id,
                version: s.current_version(),
                node_count: s.node_count(),
                pending_deltas: s.pending_delta_count(),
            })
            .collect();

        EngineStats {
            shards,
            cache_entries: self.cache.len(),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            reject_counts: self.pipeline.reject_counts(),
            backpressure_dropped: self.pipeline.backpressure_dropped(),
            personalization_users: self.personalization.user_count(),
        }
    }
}

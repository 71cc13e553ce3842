//------------ Config ---------------------------------------------------------
//!
//! Configuration options for the suggestion engine. Loading a config
//! from a file or environment is the embedder's job (out of scope, see
//! §1/§6 of the specification); this module only defines the typed
//! surface and validates it.

use serde::{Deserialize, Serialize};

/// The score weights used by the ranking engine (§4.3). Must sum to
/// `1.0` within `WEIGHT_SUM_EPSILON`; `EngineConfig::validate` enforces
/// this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub w_popularity: f64,
    pub w_recency: f64,
    pub w_personal: f64,
    pub w_trending: f64,
    pub w_match_quality: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            w_popularity: 0.30,
            w_recency: 0.15,
            w_personal: 0.25,
            w_trending: 0.20,
            w_match_quality: 0.10,
        }
    }
}

const WEIGHT_SUM_EPSILON: f64 = 1e-6;

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.w_popularity
            + self.w_recency
            + self.w_personal
            + self.w_trending
            + self.w_match_quality
    }

    pub fn is_valid(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_EPSILON
    }
}

/// Every configuration option the core recognizes (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub shard_count: u32,
    pub top_k_per_node: usize,
    pub result_limit: usize,
    pub result_cache_ttl_ms: i64,
    pub result_cache_max_entries: usize,
    pub trending_bucket_ms: i64,
    pub trending_window_buckets: usize,
    pub flush_interval_ms: u64,
    pub delta_map_soft_cap: usize,
    pub user_history_cap: usize,
    pub personal_half_life_days: f64,
    pub recency_half_life_hours: f64,
    pub query_deadline_ms: u64,
    pub weights: ScoreWeights,
    /// Normalization constant for the trending signal (§4.3). The
    /// source material calls the value 1000 illustrative rather than
    /// prescriptive; exposing it here lets an operator retune it
    /// without a rebuild.
    pub trending_norm: f64,
    /// Number of coarse buckets a user id is hashed into for the result
    /// cache key (§4.8).
    pub cache_user_buckets: u32,
    /// How many days of inactivity before a user's history is eligible
    /// for `sweep_expired_users` (§4.5).
    pub user_retention_days: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shard_count: 16,
            top_k_per_node: 10,
            result_limit: 10,
            result_cache_ttl_ms: 60_000,
            result_cache_max_entries: 100_000,
            trending_bucket_ms: 5 * 60 * 1000,
            trending_window_buckets: 12,
            flush_interval_ms: 60_000,
            delta_map_soft_cap: 1_000_000,
            user_history_cap: 200,
            personal_half_life_days: 30.0,
            recency_half_life_hours: 168.0,
            query_deadline_ms: 50,
            weights: ScoreWeights::default(),
            trending_norm: 1000.0,
            cache_user_buckets: 1024,
            user_retention_days: 30.0,
        }
    }
}

/// An invalid `EngineConfig`, as reported by `validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Error: invalid configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shard_count == 0 {
            return Err(ConfigError("shard_count must be >= 1".into()));
        }
        if self.top_k_per_node == 0 {
            return Err(ConfigError("top_k_per_node must be >= 1".into()));
        }
        if self.result_limit == 0 || self.result_limit > self.top_k_per_node {
            return Err(ConfigError(
                "result_limit must be >= 1 and <= top_k_per_node".into(),
            ));
        }
        if self.trending_window_buckets == 0 {
            return Err(ConfigError("trending_window_buckets must be >= 1".into()));
        }
        if !self.weights.is_valid() {
            return Err(ConfigError(format!(
                "score weights must sum to 1.0, got {}",
                self.weights.sum()
            )));
        }
        Ok(())
    }
}

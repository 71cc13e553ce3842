//------------ Core record types ---------------------------------------------
//!
//! Typed result shapes for the query boundary. Keeping these as distinct
//! record types (rather than passing maps around) is one of the
//! re-architecting notes carried over from the design: a `Suggestion`
//! is not a `ScoredSuggestion` is not a `CacheEntry`.

use std::time::{SystemTime, UNIX_EPOCH};

/// Epoch milliseconds, the timestamp unit used throughout the system.
pub type TimestampMs = i64;

/// Returns the current wall-clock time as epoch milliseconds.
pub fn now_ms() -> TimestampMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as TimestampMs)
        .unwrap_or(0)
}

/// A top-K suggestion as returned by `lookup`, before ranking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Suggestion {
    pub phrase: String,
    pub count: u64,
    pub last_updated_ms: TimestampMs,
    pub category: Option<String>,
}

/// A suggestion after the ranking engine has scored it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScoredSuggestion {
    pub phrase: String,
    pub score: f64,
    /// Kept alongside `score` so the ranking tie-break (popularity, then
    /// phrase) can be applied without recomputing anything.
    pub popularity: f64,
}

impl Eq for ScoredSuggestion {}

/// A record in the index builder's deterministic input snapshot (§3.1).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotRecord {
    pub phrase: String,
    pub count: u64,
    pub last_updated_ms: TimestampMs,
    pub category: Option<String>,
}

/// A cache key: the normalized prefix plus an optional coarse user
/// bucket. See §4.8 for why personalized queries still participate in
/// the cache rather than bypassing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub prefix: String,
    pub user_bucket: Option<u32>,
}

/// The value stored in the result cache: a ranked, final answer plus
/// the wall-clock time it was computed, used to check TTL expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub suggestions: Vec<ScoredSuggestion>,
    pub created_at_ms: TimestampMs,
}

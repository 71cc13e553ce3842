//------------ Personalization Store (C5) -------------------------------------
//!
//! Per-user recent-query weights with time decay. Each user's history
//! uses its own lock (§5 "user history uses per-user locking"); the
//! outer map is a concurrent hash map so distinct users never contend
//! with each other.

use std::collections::VecDeque;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::phrase::TimestampMs;

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Debug, Clone)]
struct HistoryEntry {
    phrase: String,
    timestamp_ms: TimestampMs,
}

struct UserHistory {
    entries: VecDeque<HistoryEntry>,
    last_accessed_ms: TimestampMs,
}

impl UserHistory {
    fn new(now_ms: TimestampMs) -> Self {
        Self { entries: VecDeque::new(), last_accessed_ms: now_ms }
    }
}

/// Per-user recent-query history with exponential time decay scoring.
pub struct PersonalizationStore {
    history_cap: usize,
    users: DashMap<String, Mutex<UserHistory>>,
}

impl PersonalizationStore {
    pub fn new(history_cap: usize) -> Self {
        Self { history_cap, users: DashMap::new() }
    }

    /// §4.5: push to front of the user's bounded history, deduping by
    /// phrase (keeping only the most recent occurrence).
    pub fn record_query(&self, user_id: &str, phrase: &str, timestamp_ms: TimestampMs) {
        let lock = self
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| Mutex::new(UserHistory::new(timestamp_ms)));
        let mut history = lock.lock();
        history.entries.retain(|e| e.phrase != phrase);
        history.entries.push_front(HistoryEntry { phrase: phrase.to_string(), timestamp_ms });
        history.entries.truncate(self.history_cap);
        history.last_accessed_ms = timestamp_ms;
    }

    /// §4.5: `exp(-days_since / half_life_days)` if `phrase` is in the
    /// user's history, else `0`. Reading also counts as activity and
    /// refreshes the retention watermark.
    pub fn score(&self, user_id: &str, phrase: &str, now_ms: TimestampMs, half_life_days: f64) -> f64 {
        let Some(lock) = self.users.get(user_id) else { return 0.0 };
        let mut history = lock.lock();
        history.last_accessed_ms = history.last_accessed_ms.max(now_ms);
        match history.entries.iter().find(|e| e.phrase == phrase) {
            Some(entry) => {
                let days_since = (now_ms - entry.timestamp_ms).max(0) as f64 / MS_PER_DAY;
                (-days_since / half_life_days).exp()
            }
            None => 0.0,
        }
    }

    /// Explicit deletion request for one user's history.
    pub fn delete_user(&self, user_id: &str) {
        self.users.remove(user_id);
    }

    /// Admin-invokable retention sweep (§4.5 resolved open question): no
    /// background timer is spawned by the core, the embedder calls this
    /// periodically alongside its rebuild scheduler.
    pub fn sweep_expired(&self, now_ms: TimestampMs, retention_days: f64) -> usize {
        let retention_ms = (retention_days * MS_PER_DAY) as i64;
        let stale: Vec<String> = self
            .users
            .iter()
            .filter(|entry| now_ms - entry.value().lock().last_accessed_ms > retention_ms)
            .map(|entry| entry.key().clone())
            .collect();
        let removed = stale.len();
        for user_id in stale {
            self.users.remove(&user_id);
        }
        removed
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_decays_with_age() {
        let store = PersonalizationStore::new(200);
        store.record_query("u1", "apple", 0);
        let fresh = store.score("u1", "apple", 0, 30.0);
        let aged = store.score("u1", "apple", (30.0 * MS_PER_DAY) as i64, 30.0);
        assert!((fresh - 1.0).abs() < 1e-9);
        assert!(aged < fresh);
        assert!((aged - (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn unknown_phrase_scores_zero() {
        let store = PersonalizationStore::new(200);
        store.record_query("u1", "apple", 0);
        assert_eq!(store.score("u1", "banana", 0, 30.0), 0.0);
        assert_eq!(store.score("nobody", "apple", 0, 30.0), 0.0);
    }

    #[test]
    fn dedupes_keeping_most_recent() {
        let store = PersonalizationStore::new(200);
        store.record_query("u1", "apple", 0);
        store.record_query("u1", "banana", 10);
        store.record_query("u1", "apple", 20);
        let score_now = store.score("u1", "apple", 20, 30.0);
        assert!((score_now - 1.0).abs() < 1e-9);
    }

    #[test]
    fn history_capped_at_h() {
        let store = PersonalizationStore::new(3);
        for i in 0..10 {
            store.record_query("u1", &format!("p{i}"), i as i64);
        }
        assert_eq!(store.score("u1", "p0", 100, 30.0), 0.0);
        assert!(store.score("u1", "p9", 100, 30.0) > 0.0);
    }

    #[test]
    fn sweep_removes_stale_users() {
        let store = PersonalizationStore::new(200);
        store.record_query("u1", "apple", 0);
        let far_future = (40.0 * MS_PER_DAY) as i64;
        let removed = store.sweep_expired(far_future, 30.0);
        assert_eq!(removed, 1);
        assert_eq!(store.user_count(), 0);
    }
}

//------------ Ranking Engine (C3) ---------------------------------------------
//!
//! Scores and reorders candidate completions using popularity, recency,
//! personalization, trending and match-quality signals, combined as a
//! config-driven linear combination (§4.3).

use std::time::Instant;

use crate::config::EngineConfig;
use crate::personalization::PersonalizationStore;
use crate::phrase::{ScoredSuggestion, Suggestion, TimestampMs};
use crate::ranking::signal::{match_quality, SignalValues};
use crate::trending::TrendingCounter;

/// Everything `rank` needs to know about the request beyond the
/// candidate list itself.
pub struct RankContext<'a> {
    pub normalized_prefix: &'a str,
    pub user_id: Option<&'a str>,
    pub now_ms: TimestampMs,
    /// Absolute wall-clock deadline for this request (§5). `None` means
    /// unbounded, used by tests and the admin CLI.
    pub deadline: Option<Instant>,
}

pub struct RankingEngine<'a> {
    config: &'a EngineConfig,
}

impl<'a> RankingEngine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// §4.3: scores every candidate, sorts by score descending (ties:
    /// higher popularity, then phrase ascending), and returns the top
    /// `limit` (default `config.result_limit`).
    ///
    /// If any signal provider (`personalization`) is absent, or the
    /// deadline is exceeded partway through, the affected signal is
    /// treated as `0` for the rest of the batch — this is `Degraded`,
    /// not a failure (§4.3, §7).
    pub fn rank(
        &self,
        candidates: &[Suggestion],
        context: &RankContext,
        trending: &TrendingCounter,
        personalization: Option<&PersonalizationStore>,
        limit: Option<usize>,
    ) -> Vec<ScoredSuggestion> {
        let weights = &self.config.weights;
        let mut deadline_exceeded = false;
        let mut scored: Vec<ScoredSuggestion> = candidates
            .iter()
            .map(|candidate| {
                let values = self.score_one(
                    candidate,
                    context,
                    trending,
                    personalization,
                    &mut deadline_exceeded,
                );
                ScoredSuggestion {
                    phrase: candidate.phrase.clone(),
                    score: values.weighted_sum(weights),
                    popularity: values.popularity,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.popularity.partial_cmp(&a.popularity).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.phrase.cmp(&b.phrase))
        });

        let limit = limit.unwrap_or(self.config.result_limit);
        scored.truncate(limit);
        scored
    }

    fn score_one(
        &self,
        candidate: &Suggestion,
        context: &RankContext,
        trending: &TrendingCounter,
        personalization: Option<&PersonalizationStore>,
        deadline_exceeded: &mut bool,
    ) -> SignalValues {
        let mut values = SignalValues::default();

        values.popularity = (candidate.count as f64 + 1.0).log10();
        *deadline_exceeded = *deadline_exceeded || self.past_deadline(context);

        if !*deadline_exceeded {
            let age_hours =
                (context.now_ms - candidate.last_updated_ms).max(0) as f64 / (60.0 * 60.0 * 1000.0);
            values.recency = (-age_hours / self.config.recency_half_life_hours).exp();
        }
        *deadline_exceeded = *deadline_exceeded || self.past_deadline(context);

        if !*deadline_exceeded {
            values.personal = match (context.user_id, personalization) {
                (Some(user_id), Some(store)) => {
                    store.score(user_id, &candidate.phrase, context.now_ms, self.config.personal_half_life_days)
                }
                _ => 0.0,
            };
        }
        *deadline_exceeded = *deadline_exceeded || self.past_deadline(context);

        if !*deadline_exceeded {
            let raw = trending.score_at(&candidate.phrase, context.now_ms) as f64;
            values.trending = (raw / self.config.trending_norm).min(1.0);
        }
        *deadline_exceeded = *deadline_exceeded || self.past_deadline(context);

        if !*deadline_exceeded {
            values.match_quality = match_quality(&candidate.phrase, context.normalized_prefix);
        }

        values
    }

    fn past_deadline(&self, context: &RankContext) -> bool {
        context.deadline.map(|d| Instant::now() > d).unwrap_or(false)
    }
}

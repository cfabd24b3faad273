//! Live strategy (spec §4.4): score every surviving candidate on demand.

use std::collections::HashMap;

use chrono::Utc;

use crate::core::compat;
use crate::core::filters::{FilterContext, FilterPipeline};
use crate::core::strategy::{
    base_score, effective_min_score, trust_multiplier, CandidateOutcome, ScoredCandidate,
    StrategyDeps, StrategyError, StrategyKind,
};
use crate::models::CandidateRequest;

pub struct LiveStrategy {
    pipeline: FilterPipeline,
}

impl Default for LiveStrategy {
    fn default() -> Self {
        Self {
            pipeline: FilterPipeline::default_pipeline(),
        }
    }
}

impl LiveStrategy {
    pub fn new(pipeline: FilterPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn get_candidates(
        &self,
        deps: &StrategyDeps,
        user_id: i64,
        request: &CandidateRequest,
    ) -> Result<CandidateOutcome, StrategyError> {
        let Some(requester) = deps.profiles.get(user_id).await? else {
            // NotFound: requester missing/inactive -> empty, exhausted (spec §7).
            return Ok(CandidateOutcome {
                candidates: Vec::new(),
                total_filtered: 0,
                total_scored: 0,
                strategy_used: StrategyKind::Live,
                queue_exhausted: true,
                suggestions_remaining: None,
            });
        };

        let swiped_ids = deps.swipe.swiped_ids(user_id).await;
        let blocked_ids = deps.safety.blocked_ids(user_id).await;

        let filter_limit = (request.limit as i64 * 3).max(1);
        let ctx = FilterContext {
            requester: &requester,
            swiped_ids: &swiped_ids,
            blocked_ids: &blocked_ids,
            options: request,
        };
        let candidates = deps.profiles.candidates(&self.pipeline, &ctx, filter_limit).await?;
        let total_filtered = candidates.len();

        let now = Utc::now();
        let min_score = effective_min_score(request.min_score, &deps.config);

        let mut scored: Vec<ScoredCandidate> = Vec::new();
        for candidate in candidates {
            let result = compat::compute(
                &requester,
                &candidate,
                now,
                deps.config.lifestyle_penalties,
                deps.config.activity_half_life_days,
            );
            if result.overall < min_score {
                continue;
            }
            let desirability_score = candidate.desirability_score;
            let base = base_score(result.overall, result.activity, desirability_score);
            scored.push(ScoredCandidate {
                profile: candidate,
                compatibility: base, // multiplier applied below once trust is known
                compatibility_score: result.overall,
                activity_score: result.activity,
                desirability_score,
            });
        }
        let total_scored = scored.len();

        let target_ids: Vec<i64> = scored.iter().map(|c| c.profile.user_id).collect();
        let trust_scores: HashMap<i64, f64> = deps
            .swipe
            .batch_trust_scores(&target_ids)
            .await
            .into_iter()
            .collect();

        for candidate in &mut scored {
            let trust = trust_scores
                .get(&candidate.profile.user_id)
                .copied()
                .unwrap_or(crate::services::DEFAULT_TRUST_SCORE);
            candidate.compatibility *= trust_multiplier(trust);
        }

        scored.sort_by(|a, b| b.compatibility.total_cmp(&a.compatibility));
        scored.truncate(request.limit as usize);

        Ok(CandidateOutcome {
            candidates: scored,
            total_filtered,
            total_scored,
            strategy_used: StrategyKind::Live,
            queue_exhausted: false,
            suggestions_remaining: None,
        })
    }
}

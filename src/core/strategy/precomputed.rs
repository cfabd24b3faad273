//! Pre-computed strategy (spec §4.4): serve from the cached score table,
//! re-validating dealbreakers and falling back to Live to fill gaps.

use std::collections::HashSet;

use crate::core::filters::{FilterContext, FilterPipeline};
use crate::core::strategy::{
    effective_min_score, live::LiveStrategy, CandidateOutcome, ScoredCandidate, StrategyDeps,
    StrategyError, StrategyKind,
};
use crate::models::CandidateRequest;

pub struct PrecomputedStrategy {
    pipeline: FilterPipeline,
    live_fallback: LiveStrategy,
}

impl Default for PrecomputedStrategy {
    fn default() -> Self {
        Self {
            pipeline: FilterPipeline::default_pipeline(),
            live_fallback: LiveStrategy::default(),
        }
    }
}

impl PrecomputedStrategy {
    pub async fn get_candidates(
        &self,
        deps: &StrategyDeps,
        user_id: i64,
        request: &CandidateRequest,
    ) -> Result<CandidateOutcome, StrategyError> {
        let Some(requester) = deps.profiles.get(user_id).await? else {
            return Ok(CandidateOutcome {
                candidates: Vec::new(),
                total_filtered: 0,
                total_scored: 0,
                strategy_used: StrategyKind::Precomputed,
                queue_exhausted: true,
                suggestions_remaining: None,
            });
        };

        let fetch_limit = (request.limit as i64 * 3).max(1);
        let rows = deps
            .scores
            .top_fresh_for_user(user_id, deps.config.score_ttl_hours, fetch_limit)
            .await?;

        if rows.is_empty() {
            // Step 3: no rows -> fall back to Live wholesale.
            let mut outcome = self.live_fallback.get_candidates(deps, user_id, request).await?;
            outcome.strategy_used = StrategyKind::Live;
            return Ok(outcome);
        }

        let swiped_ids = deps.swipe.swiped_ids(user_id).await;
        let blocked_ids = deps.safety.blocked_ids(user_id).await;
        let candidate_ids: Vec<i64> = rows.iter().map(|r| r.target_user_id).collect();

        let ctx = FilterContext {
            requester: &requester,
            swiped_ids: &swiped_ids,
            blocked_ids: &blocked_ids,
            options: request,
        };
        let surviving_profiles = deps
            .profiles
            .candidates_by_id(&self.pipeline, &ctx, &candidate_ids)
            .await?;
        let total_filtered = surviving_profiles.len();
        let surviving_ids: HashSet<i64> = surviving_profiles.iter().map(|p| p.user_id).collect();
        let mut profiles_by_id: std::collections::HashMap<i64, _> =
            surviving_profiles.into_iter().map(|p| (p.user_id, p)).collect();

        let min_score = effective_min_score(request.min_score, &deps.config);

        let mut scored: Vec<ScoredCandidate> = Vec::new();
        for row in &rows {
            if !surviving_ids.contains(&row.target_user_id) {
                continue;
            }
            if row.overall_score < min_score {
                continue;
            }
            let Some(profile) = profiles_by_id.remove(&row.target_user_id) else {
                continue;
            };
            scored.push(ScoredCandidate {
                compatibility: row.overall_score,
                compatibility_score: row.overall_score,
                activity_score: row.activity_score,
                desirability_score: profile.desirability_score,
                profile,
            });
        }
        let total_scored = scored.len();

        let mut seen_ids: HashSet<i64> = scored.iter().map(|c| c.profile.user_id).collect();
        scored.sort_by(|a, b| b.compatibility.total_cmp(&a.compatibility));
        scored.truncate(request.limit as usize);

        if scored.len() < request.limit as usize {
            // Step 6: supplement with Live for the remainder, de-duplicated.
            let remaining = request.limit - scored.len() as u32;
            let mut supplement_request = *request;
            supplement_request.limit = remaining;
            let supplement = self
                .live_fallback
                .get_candidates(deps, user_id, &supplement_request)
                .await?;

            for candidate in supplement.candidates {
                if seen_ids.insert(candidate.profile.user_id) {
                    scored.push(candidate);
                }
            }
        }

        Ok(CandidateOutcome {
            candidates: scored,
            total_filtered,
            total_scored,
            strategy_used: StrategyKind::Precomputed,
            queue_exhausted: false,
            suggestions_remaining: None,
        })
    }
}

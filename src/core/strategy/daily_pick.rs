//! Daily-pick strategy (spec §4.4): serve today's materialized picks.

use chrono::Utc;

use crate::core::strategy::{live::LiveStrategy, CandidateOutcome, ScoredCandidate, StrategyDeps, StrategyError, StrategyKind};
use crate::models::CandidateRequest;

pub struct DailyPickStrategy {
    live_fallback: LiveStrategy,
}

impl Default for DailyPickStrategy {
    fn default() -> Self {
        Self {
            live_fallback: LiveStrategy::default(),
        }
    }
}

impl DailyPickStrategy {
    pub async fn get_candidates(
        &self,
        deps: &StrategyDeps,
        user_id: i64,
        request: &CandidateRequest,
    ) -> Result<CandidateOutcome, StrategyError> {
        let now = Utc::now();
        let picks = deps
            .daily_picks
            .select_unexpired_unacted(user_id, now, request.limit as i64)
            .await?;

        if picks.is_empty() {
            // Step 2: empty -> fall back to Live.
            let mut outcome = self.live_fallback.get_candidates(deps, user_id, request).await?;
            outcome.strategy_used = StrategyKind::Live;
            return Ok(outcome);
        }

        let total_unseen_today = deps.daily_picks.count_unseen(user_id, now).await?;

        let served_ids: Vec<i64> = picks.iter().map(|p| p.id).collect();
        deps.daily_picks.mark_seen(&served_ids).await?;

        let mut scored = Vec::with_capacity(picks.len());
        for pick in &picks {
            if let Some(profile) = deps.profiles.get(pick.candidate_user_id).await? {
                scored.push(ScoredCandidate {
                    compatibility: pick.score,
                    compatibility_score: pick.score,
                    activity_score: 0.0,
                    desirability_score: profile.desirability_score,
                    profile,
                });
            }
        }

        let served_count = scored.len() as i64;
        let suggestions_remaining = (total_unseen_today - served_count).max(0) as u32;
        let queue_exhausted = total_unseen_today <= served_count;

        Ok(CandidateOutcome {
            total_filtered: scored.len(),
            total_scored: scored.len(),
            candidates: scored,
            strategy_used: StrategyKind::DailyPick,
            queue_exhausted,
            suggestions_remaining: Some(suggestions_remaining),
        })
    }
}

//! Scoring strategies (spec §4.4) and their resolver (spec §4.5).
//!
//! All three strategies implement the same shape: given a requester and a
//! clamped [`CandidateRequest`], produce a [`CandidateOutcome`]. They share
//! [`StrategyDeps`], a bundle of the store repositories and external
//! service clients every strategy needs.

pub mod daily_pick;
pub mod live;
pub mod precomputed;
pub mod resolver;

use std::sync::Arc;

use thiserror::Error;

use crate::core::compat::LifestylePenalties;
use crate::models::Profile;
use crate::services::{SafetyServiceClient, SwipeServiceClient};
use crate::store::{DailyPickRepo, MetricRepo, ProfileRepo, ScoreRepo};

pub use daily_pick::DailyPickStrategy;
pub use live::LiveStrategy;
pub use precomputed::PrecomputedStrategy;
pub use resolver::StrategyResolver;

/// Which strategy actually produced a result. Distinct from
/// [`crate::models::StrategyOverride`], which is the caller's request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Live,
    Precomputed,
    DailyPick,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Live => "Live",
            StrategyKind::Precomputed => "PreComputed",
            StrategyKind::DailyPick => "DailyPick",
        }
    }
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),
}

/// One scored candidate, carrying the full breakdown the candidate
/// endpoint always exposes for observability (spec §6).
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub profile: Profile,
    /// `finalScore`, after the shadow-restrict trust multiplier.
    pub compatibility: f64,
    /// Raw compatibility sub-score, before activity/desirability blending.
    pub compatibility_score: f64,
    pub activity_score: f64,
    pub desirability_score: f64,
}

/// Uniform strategy result (spec §4.4: `Result{candidates, totalFiltered,
/// totalScored, strategyName, elapsed, queueExhausted, suggestionsRemaining}`).
#[derive(Debug, Clone)]
pub struct CandidateOutcome {
    pub candidates: Vec<ScoredCandidate>,
    pub total_filtered: usize,
    pub total_scored: usize,
    pub strategy_used: StrategyKind,
    pub queue_exhausted: bool,
    pub suggestions_remaining: Option<u32>,
}

/// Configuration every strategy reads (spec §6 "Configuration").
#[derive(Debug, Clone, Copy)]
pub struct StrategyConfig {
    pub default_min_score: f64,
    pub score_ttl_hours: i64,
    pub activity_half_life_days: f64,
    pub lifestyle_penalties: LifestylePenalties,
    pub picks_per_user: u32,
    pub daily_pick_expiry_hours: i64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            default_min_score: 0.0,
            score_ttl_hours: crate::core::compat::DEFAULT_SCORE_TTL_HOURS,
            activity_half_life_days: 7.0,
            lifestyle_penalties: LifestylePenalties::default(),
            picks_per_user: 10,
            daily_pick_expiry_hours: 24,
        }
    }
}

/// Shared handles every strategy needs: store repositories and outbound
/// service clients. Cheap to clone — everything inside is already an
/// `Arc`/pool handle.
#[derive(Clone)]
pub struct StrategyDeps {
    pub profiles: ProfileRepo,
    pub scores: ScoreRepo,
    pub daily_picks: DailyPickRepo,
    pub metrics: MetricRepo,
    pub swipe: Arc<SwipeServiceClient>,
    pub safety: Arc<SafetyServiceClient>,
    pub config: StrategyConfig,
}

/// Effective minimum score for a request: the caller's `minScore` if
/// positive, else the configured default (spec §4.4 Live step 4).
pub fn effective_min_score(request_min_score: f64, config: &StrategyConfig) -> f64 {
    if request_min_score > 0.0 {
        request_min_score
    } else {
        config.default_min_score
    }
}

/// The `base` blend shared by Live and the refresher's write-through
/// compute (spec §4.4 step 6, §4.6 step 4c): `0.7*compat + 0.15*activity +
/// 0.15*desirability`.
pub fn base_score(compat: f64, activity: f64, desirability: f64) -> f64 {
    0.7 * compat + 0.15 * activity + 0.15 * desirability
}

/// Shadow-restrict multiplier from a trust score in `[0,100]`, mapping to
/// `[0.5, 1.0]` (spec §4.4 step 7, §8 monotonicity property).
pub fn trust_multiplier(trust: f64) -> f64 {
    0.5 + trust.clamp(0.0, 100.0) / 200.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_multiplier_bounds() {
        assert_eq!(trust_multiplier(100.0), 1.0);
        assert_eq!(trust_multiplier(0.0), 0.5);
    }

    #[test]
    fn trust_multiplier_is_monotone() {
        assert!(trust_multiplier(80.0) > trust_multiplier(20.0));
    }

    #[test]
    fn effective_min_score_prefers_positive_request_value() {
        let config = StrategyConfig::default();
        assert_eq!(effective_min_score(30.0, &config), 30.0);
        assert_eq!(effective_min_score(0.0, &config), config.default_min_score);
    }

    #[test]
    fn strategy_kind_names_match_spec_strings() {
        assert_eq!(StrategyKind::Live.as_str(), "Live");
        assert_eq!(StrategyKind::Precomputed.as_str(), "PreComputed");
        assert_eq!(StrategyKind::DailyPick.as_str(), "DailyPick");
    }
}

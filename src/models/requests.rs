use serde::{Deserialize, Serialize};

/// Which scoring strategy to use for a candidate request.
///
/// An unrecognized value deserializes fine (it's carried as a raw string
/// through query parsing) and is resolved to `Auto` with a warning by the
/// strategy resolver (spec §4.5, §7 StrategyResolution). `DailyPick` is
/// explicit-only: the resolver's `Auto` mode never selects it, since it
/// chooses only between `Live` and `Precomputed` (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyOverride {
    Live,
    Precomputed,
    Auto,
    DailyPick,
}

impl StrategyOverride {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "live" => Some(StrategyOverride::Live),
            "precomputed" => Some(StrategyOverride::Precomputed),
            "auto" => Some(StrategyOverride::Auto),
            "dailypick" | "daily_pick" | "daily-pick" => Some(StrategyOverride::DailyPick),
            _ => None,
        }
    }
}

/// Raw query parameters for the candidate endpoint (spec §6).
///
/// Every field here is optional and clamped, never rejected: an invalid
/// query parameter is an `InputClamp`, not an error (spec §7).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateQueryParams {
    pub limit: Option<i64>,
    pub min_score: Option<f64>,
    pub active_within: Option<i64>,
    pub only_verified: Option<bool>,
    pub strategy: Option<String>,
}

/// Clamped, validated request passed down into the strategy layer.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRequest {
    pub limit: u32,
    pub min_score: f64,
    pub active_within_days: Option<u32>,
    pub only_verified: bool,
    pub strategy_override: Option<StrategyOverride>,
}

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 50;

impl CandidateRequest {
    /// Build a clamped request from raw query params per spec §6:
    /// `limit ∈ [1, 50]` default 20; `minScore ∈ [0, 100]` default 0;
    /// `activeWithin ∈ [1, 365] ∪ {unset}`; unknown strategy falls back
    /// silently (becomes `None`, which the resolver treats as "no override").
    pub fn from_params(params: &CandidateQueryParams) -> Self {
        let limit = params
            .limit
            .map(|l| l.clamp(1, MAX_LIMIT as i64) as u32)
            .unwrap_or(DEFAULT_LIMIT);

        let min_score = params
            .min_score
            .map(|s| s.clamp(0.0, 100.0))
            .unwrap_or(0.0);

        let active_within_days = params
            .active_within
            .map(|d| d.clamp(1, 365) as u32);

        let strategy_override = params
            .strategy
            .as_deref()
            .and_then(StrategyOverride::parse);

        Self {
            limit,
            min_score,
            active_within_days,
            only_verified: params.only_verified.unwrap_or(false),
            strategy_override,
        }
    }
}

impl Default for CandidateRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            min_score: 0.0,
            active_within_days: None,
            only_verified: false,
            strategy_override: None,
        }
    }
}

/// Body for the mutual-match sink (spec §6).
#[derive(Debug, Clone, Deserialize)]
pub struct RecordMatchRequest {
    pub user1_id: i64,
    pub user2_id: i64,
    pub compatibility_score: Option<f64>,
    pub source: String,
}

/// Body for a single activity ping.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityPingRequest {
    pub user_id: i64,
}

/// Body for a batch activity ping.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityPingBatchRequest {
    pub user_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_limit_to_max() {
        let req = CandidateRequest::from_params(&CandidateQueryParams {
            limit: Some(9999),
            ..Default::default()
        });
        assert_eq!(req.limit, MAX_LIMIT);
    }

    #[test]
    fn clamps_limit_below_one() {
        let req = CandidateRequest::from_params(&CandidateQueryParams {
            limit: Some(0),
            ..Default::default()
        });
        assert_eq!(req.limit, 1);
    }

    #[test]
    fn defaults_when_absent() {
        let req = CandidateRequest::from_params(&CandidateQueryParams::default());
        assert_eq!(req.limit, DEFAULT_LIMIT);
        assert_eq!(req.min_score, 0.0);
        assert_eq!(req.active_within_days, None);
        assert!(req.strategy_override.is_none());
    }

    #[test]
    fn unknown_strategy_falls_back_silently() {
        let req = CandidateRequest::from_params(&CandidateQueryParams {
            strategy: Some("quantum".to_string()),
            ..Default::default()
        });
        assert!(req.strategy_override.is_none());
    }

    #[test]
    fn min_score_clamped_to_unit_range() {
        let req = CandidateRequest::from_params(&CandidateQueryParams {
            min_score: Some(-5.0),
            ..Default::default()
        });
        assert_eq!(req.min_score, 0.0);

        let req = CandidateRequest::from_params(&CandidateQueryParams {
            min_score: Some(250.0),
            ..Default::default()
        });
        assert_eq!(req.min_score, 100.0);
    }
}

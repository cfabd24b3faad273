use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single candidate record returned by the candidate endpoint (spec §6).
///
/// Strategy-used and the score breakdown are always included for
/// observability, even when not requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub user_id: i64,
    pub age: u8,
    pub gender: String,
    pub city: Option<String>,
    /// `finalScore`: after shadow-restrict multiplier.
    pub compatibility: f64,
    /// Raw compatibility sub-score, before activity/desirability blending.
    pub compatibility_score: f64,
    pub activity_score: f64,
    pub desirability_score: f64,
    pub strategy_used: String,
    pub is_verified: bool,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub candidates: Vec<CandidateRecord>,
    pub total_filtered: usize,
    pub total_scored: usize,
    pub strategy_used: String,
    pub queue_exhausted: bool,
    pub suggestions_remaining: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStatsResponse {
    pub total_matches: i64,
    pub active_matches: i64,
    pub average_compatibility_score: Option<f64>,
    pub last_match_at: Option<DateTime<Utc>>,
    pub top_reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySuggestionStatusResponse {
    pub shown_today: u32,
    pub max: u32,
    pub remaining: u32,
    pub last_reset_date: DateTime<Utc>,
    pub next_reset_date: DateTime<Utc>,
    pub queue_exhausted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMatchResponse {
    pub user1_id: i64,
    pub user2_id: i64,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPingResponse {
    pub updated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPingBatchResponse {
    pub updated: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionResponse {
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    canonical_pair, is_everyone, AlgorithmMetric, BoundingBox, DailyPick, DrinkingStatus,
    EducationLevel, InteractionType, Match, PrecomputedScore, Profile, ScoringWeights,
    SmokingStatus, UserInteraction,
};
pub use requests::{
    ActivityPingBatchRequest, ActivityPingRequest, CandidateQueryParams, CandidateRequest,
    RecordMatchRequest, StrategyOverride, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use responses::{
    ActivityPingBatchResponse, ActivityPingResponse, CandidateRecord, CandidateResponse,
    DailySuggestionStatusResponse, DeletionResponse, ErrorResponse, HealthResponse,
    MatchStatsResponse, RecordMatchResponse,
};

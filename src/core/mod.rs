// Core algorithm exports
pub mod compat;
pub mod desirability;
pub mod distance;
pub mod filters;
pub mod limiter;
pub mod strategy;

pub use compat::{CompatibilityResult, LifestylePenalties, SubScores};
pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use filters::{Filter, FilterContext, FilterKind, FilterPipeline, FilterTrace};
pub use limiter::{CheckResult, DailySuggestionLimiter, LimiterStatus};
pub use strategy::{CandidateOutcome, ScoredCandidate, StrategyConfig, StrategyDeps, StrategyError, StrategyKind, StrategyResolver};

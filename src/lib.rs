//! matchcore - the matching engine behind a dating app's candidate feed.
//!
//! Filters candidates through a typed query pipeline, scores them under one
//! of three pluggable strategies, and keeps pre-computed scores and daily
//! picks fresh via background workers.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod workers;

pub use core::distance::{calculate_bounding_box, haversine_distance};
pub use core::strategy::{CandidateOutcome, ScoredCandidate, StrategyDeps, StrategyResolver};
pub use models::{CandidateRequest, CandidateResponse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let bbox = calculate_bounding_box(40.7128, -74.0060, 10.0);
        assert!(bbox.min_lat < 40.7128);
    }
}

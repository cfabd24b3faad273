//! Unit coverage for pure functions whose modules don't already carry an
//! inline `#[cfg(test)]` suite covering the same ground, plus a few
//! cross-cutting properties worth asserting at the crate boundary.

use chrono::{Duration, Utc};
use matchcore::core::compat::LifestylePenalties;
use matchcore::core::desirability::{
    apply_elo_delta, bayesian_desirability, elo_delta, expected_outcome,
};
use matchcore::core::distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
use matchcore::core::strategy::{base_score, trust_multiplier};
use matchcore::models::domain::{AlgorithmMetric, DrinkingStatus, EducationLevel, SmokingStatus};
use matchcore::models::{CandidateRequest, Profile};
use matchcore::models::requests::{CandidateQueryParams, StrategyOverride};

fn profile(user_id: i64) -> Profile {
    Profile {
        id: user_id,
        user_id,
        gender: "female".to_string(),
        age: 28,
        latitude: 59.33,
        longitude: 18.07,
        city: None,
        country: None,
        preferred_gender: "male".to_string(),
        min_age: 25,
        max_age: 35,
        max_distance_km: 50.0,
        looking_for: None,
        wants_children: Some(true),
        has_children: Some(false),
        smoking_status: SmokingStatus::Never,
        drinking_status: DrinkingStatus::Sometimes,
        religion: Some("none".to_string()),
        education_level: Some(EducationLevel::Bachelor),
        interests: vec!["hiking".to_string()],
        location_weight: 0.3,
        age_weight: 0.2,
        interests_weight: 0.2,
        education_weight: 0.15,
        lifestyle_weight: 0.15,
        is_active: true,
        is_verified: true,
        desirability_score: 50.0,
        last_active_at: Utc::now(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn haversine_distance_is_symmetric() {
    let a = (59.33, 18.07);
    let b = (55.60, 13.00);
    let forward = haversine_distance(a.0, a.1, b.0, b.1);
    let backward = haversine_distance(b.0, b.1, a.0, a.1);
    assert!((forward - backward).abs() < 1e-9);
}

#[test]
fn haversine_distance_is_zero_for_identical_points() {
    assert_eq!(haversine_distance(59.33, 18.07, 59.33, 18.07), 0.0);
}

#[test]
fn bounding_box_always_contains_its_own_center() {
    let bbox = calculate_bounding_box(-33.87, 151.21, 25.0);
    assert!(is_within_bounding_box(-33.87, 151.21, &bbox));
}

/// Custom (non-default) lifestyle penalties should scale the deduction,
/// not just the default weights (spec §4.3).
#[test]
fn lifestyle_penalties_scale_with_custom_configuration() {
    let mut requester = profile(1);
    requester.wants_children = Some(true);
    let mut target = profile(2);
    target.wants_children = Some(false);

    let small_penalty = LifestylePenalties {
        wants_children_mismatch: 5.0,
        ..LifestylePenalties::default()
    };
    let large_penalty = LifestylePenalties {
        wants_children_mismatch: 50.0,
        ..LifestylePenalties::default()
    };

    let small = matchcore::core::compat::lifestyle_score(&requester, &target, small_penalty);
    let large = matchcore::core::compat::lifestyle_score(&requester, &target, large_penalty);
    assert!(large < small);
}

/// The Bayesian baseline and the real-time Elo nudge compose: a fresh,
/// high-signal metric plus a string of upset likes should end up higher
/// than the metric's baseline alone.
#[test]
fn desirability_baseline_and_elo_nudges_compose() {
    let now = Utc::now();
    let metric = AlgorithmMetric {
        id: 1,
        user_id: 1,
        swipes_received: 100,
        likes_received: 80,
        matches_created: 10,
        suggestions_generated: 200,
        success_rate: 0.1,
        calculated_at: now,
    };
    let baseline = bayesian_desirability(&metric, now);

    let mut current = baseline;
    for _ in 0..5 {
        let delta = elo_delta(30.0, current, 1.0);
        current = apply_elo_delta(current, delta);
    }
    assert!(current > baseline);
    assert!(current <= 100.0);
}

#[test]
fn expected_outcome_is_symmetric_around_half() {
    let p = expected_outcome(40.0, 60.0);
    let q = expected_outcome(60.0, 40.0);
    assert!((p + q - 1.0).abs() < 1e-9);
}

/// The base blend is a convex combination: replacing every input with the
/// same constant reproduces that constant.
#[test]
fn base_score_is_a_convex_combination() {
    assert_eq!(base_score(70.0, 70.0, 70.0), 70.0);
}

#[test]
fn base_score_weighs_compatibility_most_heavily() {
    let high_compat = base_score(100.0, 0.0, 0.0);
    let high_activity = base_score(0.0, 100.0, 0.0);
    let high_desirability = base_score(0.0, 0.0, 100.0);
    assert!(high_compat > high_activity);
    assert!(high_compat > high_desirability);
}

#[test]
fn trust_multiplier_never_fully_zeroes_the_base_score() {
    let base = base_score(80.0, 60.0, 50.0);
    let floored = base * trust_multiplier(0.0);
    assert!(floored > 0.0);
    assert!((floored - base * 0.5).abs() < 1e-9);
}

/// `DailyPick` parses from several casings, but the resolver's `Auto` path
/// never resolves to it (spec §4.5) — this test only covers the parsing
/// half, since the resolution half requires a store.
#[test]
fn daily_pick_strategy_override_parses_from_several_casings() {
    for raw in ["dailypick", "daily_pick", "daily-pick", "DAILYPICK"] {
        assert_eq!(StrategyOverride::parse(raw), Some(StrategyOverride::DailyPick));
    }
}

#[test]
fn candidate_request_active_within_clamps_to_documented_range() {
    let request = CandidateRequest::from_params(&CandidateQueryParams {
        active_within: Some(9999),
        ..Default::default()
    });
    assert_eq!(request.active_within_days, Some(365));

    let request = CandidateRequest::from_params(&CandidateQueryParams {
        active_within: Some(0),
        ..Default::default()
    });
    assert_eq!(request.active_within_days, Some(1));
}

#[test]
fn old_metric_decay_never_crosses_below_neutral_for_positive_rate() {
    let now = Utc::now();
    let old = now - Duration::days(365);
    let metric = AlgorithmMetric {
        id: 1,
        user_id: 1,
        swipes_received: 50,
        likes_received: 40,
        matches_created: 5,
        suggestions_generated: 80,
        success_rate: 0.1,
        calculated_at: old,
    };
    let score = bayesian_desirability(&metric, now);
    assert!(score >= 50.0);
}

//! End-to-end coverage across the filter pipeline, compatibility scorer,
//! and strategy building blocks, using in-memory profiles only (no store).

use std::collections::HashSet;

use chrono::Utc;
use matchcore::core::compat;
use matchcore::core::filters::{FilterContext, FilterPipeline};
use matchcore::core::strategy::{base_score, effective_min_score, trust_multiplier, StrategyConfig};
use matchcore::models::domain::{canonical_pair, DrinkingStatus, EducationLevel, SmokingStatus};
use matchcore::models::requests::CandidateQueryParams;
use matchcore::models::{CandidateRequest, Profile};

fn profile(user_id: i64, gender: &str, preferred_gender: &str, age: i16) -> Profile {
    Profile {
        id: user_id,
        user_id,
        gender: gender.to_string(),
        age,
        latitude: 59.33,
        longitude: 18.07,
        city: None,
        country: None,
        preferred_gender: preferred_gender.to_string(),
        min_age: 18,
        max_age: 99,
        max_distance_km: 50.0,
        looking_for: None,
        wants_children: None,
        has_children: None,
        smoking_status: SmokingStatus::Never,
        drinking_status: DrinkingStatus::Never,
        religion: None,
        education_level: Some(EducationLevel::Bachelor),
        interests: vec!["hiking".to_string()],
        location_weight: 0.3,
        age_weight: 0.2,
        interests_weight: 0.2,
        education_weight: 0.15,
        lifestyle_weight: 0.15,
        is_active: true,
        is_verified: false,
        desirability_score: 50.0,
        last_active_at: Utc::now(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Spec §8: gender matching must be bidirectional — a candidate only
/// passes if each side's preference admits the other.
#[test]
fn gender_filter_is_bidirectional_in_generated_sql() {
    let requester = profile(1, "male", "female", 30);
    let pipeline = FilterPipeline::default_pipeline();
    let swiped = HashSet::new();
    let blocked = HashSet::new();
    let options = CandidateRequest::default();
    let ctx = FilterContext {
        requester: &requester,
        swiped_ids: &swiped,
        blocked_ids: &blocked,
        options: &options,
    };
    let qb = pipeline.build(&ctx, 20);
    let sql = qb.sql();

    // Requester's own preference is bound in; candidate's preferred_gender
    // column is checked against the requester's gender or an "everyone"
    // synonym, satisfying both directions in a single predicate.
    assert!(sql.contains("profiles.gender ="));
    assert!(sql.contains("profiles.preferred_gender IN"));
    assert!(sql.contains("OR profiles.preferred_gender ="));
}

/// When the requester has no gender preference, the filter degrades to an
/// unconditional `TRUE` on that side rather than binding a value.
#[test]
fn gender_filter_everyone_preference_skips_own_side_bind() {
    let requester = profile(1, "male", "Everyone", 30);
    let pipeline = FilterPipeline::default_pipeline();
    let swiped = HashSet::new();
    let blocked = HashSet::new();
    let options = CandidateRequest::default();
    let ctx = FilterContext {
        requester: &requester,
        swiped_ids: &swiped,
        blocked_ids: &blocked,
        options: &options,
    };
    let qb = pipeline.build(&ctx, 20);
    assert!(qb.sql().contains("(TRUE) AND"));
}

/// Swiped and blocked exclusions both extend the query only when the sets
/// are non-empty; an empty set degrades to a no-op predicate (spec §4.2).
#[test]
fn exclusion_filters_grow_sql_only_when_sets_are_non_empty() {
    let requester = profile(1, "male", "female", 30);
    let pipeline = FilterPipeline::default_pipeline();
    let options = CandidateRequest::default();

    let empty_swiped = HashSet::new();
    let empty_blocked = HashSet::new();
    let ctx_empty = FilterContext {
        requester: &requester,
        swiped_ids: &empty_swiped,
        blocked_ids: &empty_blocked,
        options: &options,
    };
    let sql_empty = pipeline.build(&ctx_empty, 20).sql().to_string();

    let swiped: HashSet<i64> = [2, 3].into_iter().collect();
    let blocked: HashSet<i64> = [4].into_iter().collect();
    let ctx_full = FilterContext {
        requester: &requester,
        swiped_ids: &swiped,
        blocked_ids: &blocked,
        options: &options,
    };
    let sql_full = pipeline.build(&ctx_full, 20).sql().to_string();

    assert!(sql_full.len() > sql_empty.len());
    assert!(sql_full.contains("profiles.user_id NOT IN"));
}

/// The canonical pair used to store a mutual match is order-independent,
/// so `record_match(a, b)` and `record_match(b, a)` land on the same row.
#[test]
fn match_pair_canonicalization_is_order_independent() {
    assert_eq!(canonical_pair(7, 3), canonical_pair(3, 7));
    let (lo, hi) = canonical_pair(7, 3);
    assert!(lo < hi);
}

/// Full compatibility computation, from sub-scores through the live
/// strategy's base blend and shadow-restrict multiplier, stays in range.
#[test]
fn compatibility_to_final_score_pipeline_stays_in_bounds() {
    let requester = profile(1, "female", "male", 28);
    let mut target = profile(2, "male", "female", 30);
    target.interests = vec!["hiking".to_string(), "reading".to_string()];

    let config = StrategyConfig::default();
    let result = compat::compute(
        &requester,
        &target,
        Utc::now(),
        config.lifestyle_penalties,
        config.activity_half_life_days,
    );
    assert!((0.0..=100.0).contains(&result.overall));

    let base = base_score(result.overall, result.activity, target.desirability_score);
    assert!((0.0..=100.0).contains(&base));

    let final_score = base * trust_multiplier(100.0);
    assert!((0.0..=100.0).contains(&final_score));
    assert_eq!(final_score, base);

    let restricted = base * trust_multiplier(0.0);
    assert!(restricted <= base);
}

/// A request's `minScore` always takes precedence over the configured
/// default when positive (spec §4.4 step 4).
#[test]
fn effective_min_score_is_consistent_with_request_clamping() {
    let config = StrategyConfig {
        default_min_score: 40.0,
        ..StrategyConfig::default()
    };
    let request = CandidateRequest::from_params(&CandidateQueryParams {
        min_score: Some(15.0),
        ..Default::default()
    });
    assert_eq!(effective_min_score(request.min_score, &config), 15.0);

    let default_request = CandidateRequest::default();
    assert_eq!(effective_min_score(default_request.min_score, &config), 40.0);
}

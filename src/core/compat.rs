//! Compatibility scorer (spec §4.3): combines five weighted sub-scores into
//! an `overallScore ∈ [0,100]` for an ordered (requester, target) pair, and
//! caches the result via read-through/write-through on `PrecomputedScore`.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::core::distance::haversine_distance;
use crate::models::{DrinkingStatus, Profile, ScoringWeights, SmokingStatus};

/// All sub-scores are clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub location: f64,
    pub age: f64,
    pub interests: f64,
    pub education: f64,
    pub lifestyle: f64,
}

/// Penalty configuration for the lifestyle sub-score (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifestylePenalties {
    pub wants_children_mismatch: f64,
    pub has_children_mismatch: f64,
    pub smoking_max: f64,
    pub drinking_max: f64,
    pub religion_mismatch: f64,
}

impl Default for LifestylePenalties {
    fn default() -> Self {
        Self {
            wants_children_mismatch: 30.0,
            has_children_mismatch: 15.0,
            smoking_max: 20.0,
            drinking_max: 15.0,
            religion_mismatch: 10.0,
        }
    }
}

/// Location sub-score: 0 beyond `maxDistanceKm`, linear falloff within it.
pub fn location_score(requester: &Profile, target: &Profile) -> f64 {
    let distance_km = haversine_distance(
        requester.latitude,
        requester.longitude,
        target.latitude,
        target.longitude,
    );
    if requester.max_distance_km <= 0.0 || distance_km > requester.max_distance_km {
        return 0.0;
    }
    100.0 * (1.0 - distance_km / requester.max_distance_km)
}

/// Age sub-score: 0 outside the requester's preferred range, falling off
/// linearly from the midpoint of that range inside it.
pub fn age_score(requester: &Profile, target: &Profile) -> f64 {
    if target.age < requester.min_age || target.age > requester.max_age {
        return 0.0;
    }
    let midpoint = (requester.min_age as f64 + requester.max_age as f64) / 2.0;
    let half_range = (requester.max_age as f64 - requester.min_age as f64) / 2.0;
    if half_range <= 0.0 {
        return 100.0;
    }
    let deviation = (target.age as f64 - midpoint).abs();
    (100.0 - (deviation / half_range) * 50.0).clamp(0.0, 100.0)
}

/// Case-insensitive Jaccard similarity of interests; 50 if either is empty.
pub fn interests_score(requester: &Profile, target: &Profile) -> f64 {
    if requester.interests.is_empty() || target.interests.is_empty() {
        return 50.0;
    }
    let a: HashSet<String> = requester.interests.iter().map(|s| s.to_lowercase()).collect();
    let b: HashSet<String> = target.interests.iter().map(|s| s.to_lowercase()).collect();
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    if union == 0 {
        return 50.0;
    }
    (intersection as f64 / union as f64) * 100.0
}

/// Ordinal-distance education score; 70 if either side is missing.
pub fn education_score(requester: &Profile, target: &Profile) -> f64 {
    let (Some(a), Some(b)) = (requester.education_level, target.education_level) else {
        return 70.0;
    };
    let delta = (a.ordinal() - b.ordinal()).unsigned_abs() as f64;
    (100.0 - 15.0 * delta).max(50.0)
}

/// Lifestyle compatibility, starting at 100 and subtracting penalties for
/// each mismatch, floored at 0.
pub fn lifestyle_score(requester: &Profile, target: &Profile, penalties: LifestylePenalties) -> f64 {
    let mut score = 100.0;

    if let (Some(rw), Some(tw)) = (requester.wants_children, target.wants_children) {
        if rw != tw {
            score -= penalties.wants_children_mismatch;
        }
    }

    if let (Some(rh), Some(th)) = (requester.has_children, target.has_children) {
        if rh != th && (rh || th) {
            score -= penalties.has_children_mismatch;
        }
    }

    let smoking_delta =
        (requester.smoking_status.ordinal() as f64 - target.smoking_status.ordinal() as f64).abs();
    score -= penalties.smoking_max * smoking_delta / SmokingStatus::Often.ordinal() as f64;

    let drinking_delta =
        (requester.drinking_status.ordinal() as f64 - target.drinking_status.ordinal() as f64).abs();
    score -= penalties.drinking_max * drinking_delta / DrinkingStatus::Often.ordinal() as f64;

    if let (Some(rr), Some(tr)) = (&requester.religion, &target.religion) {
        if rr != tr {
            score -= penalties.religion_mismatch;
        }
    }

    score.max(0.0)
}

/// Activity sub-score via exponential decay from `lastActiveAt`.
///
/// The spec notes that one code path in the source returns a constant 75
/// instead; that constant is preserved as [`ACTIVITY_SCORE_FALLBACK`] for
/// callers that have no timestamp to decay from, but the strategies (and
/// this function) always prefer the decay form.
pub fn activity_score(last_active_at: DateTime<Utc>, now: DateTime<Utc>, half_life_days: f64) -> f64 {
    let delta_days = (now - last_active_at).num_seconds() as f64 / 86_400.0;
    let delta_days = delta_days.max(0.0);
    let decay = (-std::f64::consts::LN_2 * delta_days / half_life_days).exp();
    (100.0 * decay).clamp(0.0, 100.0)
}

/// Fallback constant from the legacy code path (spec §9 Open Questions).
/// Prefer [`activity_score`] wherever a `lastActiveAt` is available.
pub const ACTIVITY_SCORE_FALLBACK: f64 = 75.0;

pub fn sub_scores(requester: &Profile, target: &Profile, penalties: LifestylePenalties) -> SubScores {
    SubScores {
        location: location_score(requester, target),
        age: age_score(requester, target),
        interests: interests_score(requester, target),
        education: education_score(requester, target),
        lifestyle: lifestyle_score(requester, target, penalties),
    }
}

/// Combine sub-scores with the requester's weights plus a fixed activity
/// term (weight 0.5), clamp to `[0,100]`, round to one decimal.
pub fn combine(
    sub: SubScores,
    weights: ScoringWeights,
    activity: f64,
    activity_weight: f64,
) -> f64 {
    let weighted = weights.location * sub.location
        + weights.age * sub.age
        + weights.interests * sub.interests
        + weights.education * sub.education
        + weights.lifestyle * sub.lifestyle
        + activity_weight * activity;

    let weight_sum =
        weights.location + weights.age + weights.interests + weights.education + weights.lifestyle + activity_weight;

    let overall = if weight_sum > 0.0 {
        weighted / weight_sum
    } else {
        0.0
    };

    (overall.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

pub const DEFAULT_ACTIVITY_WEIGHT: f64 = 0.5;
pub const DEFAULT_SCORE_TTL_HOURS: i64 = 24;

/// Full compatibility computation for an ordered (requester, target) pair.
pub struct CompatibilityResult {
    pub sub_scores: SubScores,
    pub activity: f64,
    pub overall: f64,
}

pub fn compute(
    requester: &Profile,
    target: &Profile,
    now: DateTime<Utc>,
    penalties: LifestylePenalties,
    activity_half_life_days: f64,
) -> CompatibilityResult {
    let sub = sub_scores(requester, target, penalties);
    let activity = activity_score(target.last_active_at, now, activity_half_life_days);
    let overall = combine(sub, requester.weights(), activity, DEFAULT_ACTIVITY_WEIGHT);
    CompatibilityResult {
        sub_scores: sub,
        activity,
        overall,
    }
}

/// Whether a cached `PrecomputedScore.calculatedAt` is still within the TTL.
pub fn is_fresh(calculated_at: DateTime<Utc>, now: DateTime<Utc>, ttl_hours: i64) -> bool {
    now - calculated_at <= Duration::hours(ttl_hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::EducationLevel;
    use chrono::Duration as ChronoDuration;

    fn base_profile(user_id: i64) -> Profile {
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
            interests: vec!["hiking".to_string(), "reading".to_string()],
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
    fn sub_scores_are_within_unit_range() {
        let requester = base_profile(1);
        let mut target = base_profile(2);
        target.latitude = 59.35;
        target.longitude = 18.10;

        let sub = sub_scores(&requester, &target, LifestylePenalties::default());
        assert!((0.0..=100.0).contains(&sub.location));
        assert!((0.0..=100.0).contains(&sub.age));
        assert!((0.0..=100.0).contains(&sub.interests));
        assert!((0.0..=100.0).contains(&sub.education));
        assert!((0.0..=100.0).contains(&sub.lifestyle));
    }

    #[test]
    fn location_score_zero_beyond_max_distance() {
        let requester = base_profile(1);
        let mut target = base_profile(2);
        target.latitude = 55.60;
        target.longitude = 13.00; // ~500km from Stockholm
        assert_eq!(location_score(&requester, &target), 0.0);
    }

    #[test]
    fn age_score_zero_outside_range() {
        let requester = base_profile(1);
        let mut target = base_profile(2);
        target.age = 50;
        assert_eq!(age_score(&requester, &target), 0.0);
    }

    #[test]
    fn age_score_max_at_midpoint() {
        let requester = base_profile(1);
        let mut target = base_profile(2);
        target.age = 30; // midpoint of 25..35
        assert_eq!(age_score(&requester, &target), 100.0);
    }

    #[test]
    fn interests_score_empty_defaults_to_fifty() {
        let mut requester = base_profile(1);
        requester.interests.clear();
        let target = base_profile(2);
        assert_eq!(interests_score(&requester, &target), 50.0);
    }

    #[test]
    fn interests_score_full_overlap_is_100() {
        let requester = base_profile(1);
        let target = base_profile(2);
        assert_eq!(interests_score(&requester, &target), 100.0);
    }

    #[test]
    fn education_missing_defaults_to_seventy() {
        let requester = base_profile(1);
        let mut target = base_profile(2);
        target.education_level = None;
        assert_eq!(education_score(&requester, &target), 70.0);
    }

    #[test]
    fn lifestyle_floors_at_zero() {
        let mut requester = base_profile(1);
        requester.wants_children = Some(true);
        requester.smoking_status = SmokingStatus::Never;
        requester.drinking_status = DrinkingStatus::Never;
        requester.religion = Some("a".to_string());

        let mut target = base_profile(2);
        target.wants_children = Some(false);
        target.has_children = Some(true);
        target.smoking_status = SmokingStatus::Often;
        target.drinking_status = DrinkingStatus::Often;
        target.religion = Some("b".to_string());

        let score = lifestyle_score(&requester, &target, LifestylePenalties::default());
        assert!(score >= 0.0);
    }

    #[test]
    fn overall_score_bounded() {
        let requester = base_profile(1);
        let target = base_profile(2);
        let result = compute(&requester, &target, Utc::now(), LifestylePenalties::default(), 7.0);
        assert!((0.0..=100.0).contains(&result.overall));
    }

    #[test]
    fn activity_score_decays_to_half_at_half_life() {
        let now = Utc::now();
        let last_active = now - ChronoDuration::days(7);
        let score = activity_score(last_active, now, 7.0);
        assert!((score - 50.0).abs() < 1.0);
    }

    #[test]
    fn activity_score_near_100_when_just_active() {
        let now = Utc::now();
        let score = activity_score(now, now, 7.0);
        assert!(score > 99.0);
    }

    #[test]
    fn activity_score_low_after_30_days_at_7_day_half_life() {
        let now = Utc::now();
        let last_active = now - ChronoDuration::days(30);
        let score = activity_score(last_active, now, 7.0);
        assert!(score < 10.0);
    }

    #[test]
    fn is_fresh_respects_ttl() {
        let now = Utc::now();
        assert!(is_fresh(now - ChronoDuration::hours(23), now, 24));
        assert!(!is_fresh(now - ChronoDuration::hours(25), now, 24));
    }
}

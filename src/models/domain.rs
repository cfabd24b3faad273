use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gender-preference values that mean "no preference".
///
/// Kept as plain string synonyms (rather than an `Option`) because a
/// free-form preference field is what actually reaches the store; only a
/// handful of values are special-cased to mean "everyone".
pub const EVERYONE_SYNONYMS: [&str; 4] = ["Everyone", "All", "Any", ""];

pub fn is_everyone(preference: &str) -> bool {
    EVERYONE_SYNONYMS
        .iter()
        .any(|syn| syn.eq_ignore_ascii_case(preference))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "smoking_status", rename_all = "PascalCase")]
#[serde(rename_all = "PascalCase")]
pub enum SmokingStatus {
    Never,
    Sometimes,
    Often,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "drinking_status", rename_all = "PascalCase")]
#[serde(rename_all = "PascalCase")]
pub enum DrinkingStatus {
    Never,
    Sometimes,
    Often,
}

impl SmokingStatus {
    /// Ordinal used by the lifestyle sub-score penalty.
    pub fn ordinal(self) -> u8 {
        match self {
            SmokingStatus::Never => 0,
            SmokingStatus::Sometimes => 1,
            SmokingStatus::Often => 2,
        }
    }
}

impl DrinkingStatus {
    pub fn ordinal(self) -> u8 {
        match self {
            DrinkingStatus::Never => 0,
            DrinkingStatus::Sometimes => 1,
            DrinkingStatus::Often => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "education_level", rename_all = "PascalCase")]
#[serde(rename_all = "PascalCase")]
pub enum EducationLevel {
    HighSchool,
    SomeCollege,
    Bachelor,
    Master,
    PhD,
    Other,
}

impl EducationLevel {
    /// Ordinal map from spec: HighSchool=1, SomeCollege=2, Bachelor=3,
    /// Master=4, PhD=5, Other=2.
    pub fn ordinal(self) -> i32 {
        match self {
            EducationLevel::HighSchool => 1,
            EducationLevel::SomeCollege => 2,
            EducationLevel::Bachelor => 3,
            EducationLevel::Master => 4,
            EducationLevel::PhD => 5,
            EducationLevel::Other => 2,
        }
    }
}

/// A user's matching profile: demographics, preferences, lifestyle flags,
/// per-user scoring weights, and the maintained desirability signal.
///
/// Invariant: exactly one `Profile` per `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub gender: String,
    pub age: i16,
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,

    pub preferred_gender: String,
    pub min_age: i16,
    pub max_age: i16,
    pub max_distance_km: f64,
    pub looking_for: Option<String>,

    pub wants_children: Option<bool>,
    pub has_children: Option<bool>,
    pub smoking_status: SmokingStatus,
    pub drinking_status: DrinkingStatus,
    pub religion: Option<String>,
    pub education_level: Option<EducationLevel>,
    pub interests: Vec<String>,

    pub location_weight: f64,
    pub age_weight: f64,
    pub interests_weight: f64,
    pub education_weight: f64,
    pub lifestyle_weight: f64,

    pub is_active: bool,
    pub is_verified: bool,
    pub desirability_score: f64,

    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights {
            location: self.location_weight,
            age: self.age_weight,
            interests: self.interests_weight,
            education: self.education_weight,
            lifestyle: self.lifestyle_weight,
        }
    }
}

/// Weighted combination inputs for the compatibility scorer (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub location: f64,
    pub age: f64,
    pub interests: f64,
    pub education: f64,
    pub lifestyle: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            location: 0.30,
            age: 0.20,
            interests: 0.20,
            education: 0.15,
            lifestyle: 0.15,
        }
    }
}

/// Symmetric pair of users known to have mutually accepted.
///
/// Invariant: `user1_id < user2_id` (canonical ordering), enforced by
/// [`canonical_pair`] rather than trusted from callers.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub compatibility_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub match_source: String,
    pub is_active: bool,
    pub unmatched_at: Option<DateTime<Utc>>,
    pub unmatched_by_user_id: Option<i64>,
    pub unmatch_reason: Option<String>,
}

/// Canonicalize an unordered user pair so `user1 < user2` always.
pub fn canonical_pair(a: i64, b: i64) -> (i64, i64) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Directional per-(requester, target) cached compatibility score.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PrecomputedScore {
    pub id: i64,
    pub user_id: i64,
    pub target_user_id: i64,
    pub overall_score: f64,
    pub location_score: f64,
    pub age_score: f64,
    pub interests_score: f64,
    pub education_score: f64,
    /// Documented-but-idiosyncratic: the background refresher stores the raw
    /// compatibility combination here rather than a dedicated lifestyle
    /// figure. See DESIGN.md.
    pub lifestyle_score: f64,
    pub activity_score: f64,
    pub calculated_at: DateTime<Utc>,
    pub is_valid: bool,
}

/// A materialized daily-pick row for a user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyPick {
    pub id: i64,
    pub user_id: i64,
    pub candidate_user_id: i64,
    pub score: f64,
    pub rank: i32,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub seen: bool,
    pub acted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interaction_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum InteractionType {
    Like,
    Pass,
}

/// Append-only swipe record, used by desirability and health metrics.
///
/// Not used directly to exclude candidates; swiped-target ids for exclusion
/// are fetched from the external swipe service (spec §1, §6).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserInteraction {
    pub id: i64,
    pub user_id: i64,
    pub target_user_id: i64,
    pub interaction_type: InteractionType,
    pub created_at: DateTime<Utc>,
}

/// Periodic per-user summary feeding the desirability calculator.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AlgorithmMetric {
    pub id: i64,
    pub user_id: i64,
    pub swipes_received: i64,
    pub likes_received: i64,
    pub matches_created: i64,
    pub suggestions_generated: i64,
    pub success_rate: f64,
    pub calculated_at: DateTime<Utc>,
}

/// Geospatial bounding box used as a store-side pre-filter (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everyone_synonyms_match_case_insensitively() {
        assert!(is_everyone("everyone"));
        assert!(is_everyone("ALL"));
        assert!(is_everyone(""));
        assert!(!is_everyone("Female"));
    }

    #[test]
    fn canonical_pair_orders_ascending() {
        assert_eq!(canonical_pair(5, 2), (2, 5));
        assert_eq!(canonical_pair(2, 5), (2, 5));
    }

    #[test]
    fn education_ordinals_match_spec_table() {
        assert_eq!(EducationLevel::HighSchool.ordinal(), 1);
        assert_eq!(EducationLevel::SomeCollege.ordinal(), 2);
        assert_eq!(EducationLevel::Bachelor.ordinal(), 3);
        assert_eq!(EducationLevel::Master.ordinal(), 4);
        assert_eq!(EducationLevel::PhD.ordinal(), 5);
        assert_eq!(EducationLevel::Other.ordinal(), 2);
    }
}

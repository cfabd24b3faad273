//! The candidate filter pipeline (spec §4.2).
//!
//! Every filter extends a `sqlx::QueryBuilder` rather than operating on
//! materialized rows, so the pipeline never enumerates a candidate universe
//! client-side: it only grows a single parameterized SQL statement that the
//! store executes once, with the limit applied last. This is the direct
//! Rust analogue of "express each filter as a function that extends a typed
//! query builder" (see DESIGN.md).

use std::collections::HashSet;

use sqlx::{Postgres, QueryBuilder};

use crate::core::distance::calculate_bounding_box;
use crate::models::{is_everyone, CandidateRequest, Profile};

/// A filter's role in the pipeline (spec Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Hard exclusion; candidate removed if it does not pass.
    Dealbreaker,
    /// Narrows the candidate set but isn't a hard rule on its own.
    Preference,
    /// Signals influencing ordering, not exclusion.
    Ranking,
}

/// One step of the filter pipeline. `order` determines position; `apply`
/// extends the query in place rather than returning rows.
pub trait Filter: Send + Sync {
    fn name(&self) -> &'static str;
    fn order(&self) -> i32;
    fn kind(&self) -> FilterKind;
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, ctx: &FilterContext<'a>);
}

/// Bundle of inputs every filter may need (spec §4.2: "Context bundles the
/// requesting profile, a set of swiped-target IDs, a set of blocked IDs, and
/// the candidate-options configuration").
pub struct FilterContext<'a> {
    pub requester: &'a Profile,
    pub swiped_ids: &'a HashSet<i64>,
    pub blocked_ids: &'a HashSet<i64>,
    pub options: &'a CandidateRequest,
}

/// One entry of the pipeline's execution-order trace, used for
/// observability (spec §4.2: "Pipeline output includes the per-filter
/// execution-order trace").
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTrace {
    pub name: &'static str,
    pub kind: FilterKind,
    pub order: i32,
}

/// Helper for appending `AND <condition>` only after the first predicate.
fn push_and<'a>(qb: &mut QueryBuilder<'a, Postgres>, first: &mut bool) {
    if *first {
        qb.push(" WHERE ");
        *first = false;
    } else {
        qb.push(" AND ");
    }
}

struct SelfExclusionFilter;
impl Filter for SelfExclusionFilter {
    fn name(&self) -> &'static str {
        "self_exclusion"
    }
    fn order(&self) -> i32 {
        0
    }
    fn kind(&self) -> FilterKind {
        FilterKind::Dealbreaker
    }
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, ctx: &FilterContext<'a>) {
        qb.push(" profiles.user_id <> ").push_bind(ctx.requester.user_id);
    }
}

struct ActiveFilter;
impl Filter for ActiveFilter {
    fn name(&self) -> &'static str {
        "active"
    }
    fn order(&self) -> i32 {
        10
    }
    fn kind(&self) -> FilterKind {
        FilterKind::Dealbreaker
    }
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, _ctx: &FilterContext<'a>) {
        qb.push(" profiles.is_active = TRUE");
    }
}

struct GenderFilter;
impl Filter for GenderFilter {
    fn name(&self) -> &'static str {
        "gender"
    }
    fn order(&self) -> i32 {
        20
    }
    fn kind(&self) -> FilterKind {
        FilterKind::Dealbreaker
    }
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, ctx: &FilterContext<'a>) {
        // requester's preferredGender matches candidate.gender, or requester's is "everyone"
        qb.push(" (");
        if is_everyone(&ctx.requester.preferred_gender) {
            qb.push("TRUE");
        } else {
            qb.push("profiles.gender = ").push_bind(ctx.requester.preferred_gender.clone());
        }
        qb.push(")");

        // candidate.preferredGender matches requester.gender, or candidate's is "everyone"
        qb.push(" AND (profiles.preferred_gender IN (");
        let mut synonyms = qb.separated(", ");
        for syn in crate::models::domain::EVERYONE_SYNONYMS {
            synonyms.push_bind(syn);
        }
        synonyms.push_unseparated(")");
        qb.push(" OR profiles.preferred_gender = ")
            .push_bind(ctx.requester.gender.clone())
            .push(")");
    }
}

struct AgeRangeFilter;
impl Filter for AgeRangeFilter {
    fn name(&self) -> &'static str {
        "age_range"
    }
    fn order(&self) -> i32 {
        30
    }
    fn kind(&self) -> FilterKind {
        FilterKind::Dealbreaker
    }
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, ctx: &FilterContext<'a>) {
        qb.push(" profiles.age BETWEEN ")
            .push_bind(ctx.requester.min_age as i32)
            .push(" AND ")
            .push_bind(ctx.requester.max_age as i32)
            .push(" AND ")
            .push_bind(ctx.requester.age as i32)
            .push(" BETWEEN profiles.min_age AND profiles.max_age");
    }
}

struct ExcludeSwipedFilter;
impl Filter for ExcludeSwipedFilter {
    fn name(&self) -> &'static str {
        "exclude_swiped"
    }
    fn order(&self) -> i32 {
        40
    }
    fn kind(&self) -> FilterKind {
        FilterKind::Dealbreaker
    }
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, ctx: &FilterContext<'a>) {
        if ctx.swiped_ids.is_empty() {
            qb.push(" TRUE");
            return;
        }
        qb.push(" profiles.user_id NOT IN (");
        let mut ids = qb.separated(", ");
        for id in ctx.swiped_ids {
            ids.push_bind(*id);
        }
        qb.push(")");
    }
}

struct ExcludeBlockedFilter;
impl Filter for ExcludeBlockedFilter {
    fn name(&self) -> &'static str {
        "exclude_blocked"
    }
    fn order(&self) -> i32 {
        50
    }
    fn kind(&self) -> FilterKind {
        FilterKind::Dealbreaker
    }
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, ctx: &FilterContext<'a>) {
        if ctx.blocked_ids.is_empty() {
            qb.push(" TRUE");
            return;
        }
        qb.push(" profiles.user_id NOT IN (");
        let mut ids = qb.separated(", ");
        for id in ctx.blocked_ids {
            ids.push_bind(*id);
        }
        qb.push(")");
    }
}

struct OnlyVerifiedFilter;
impl Filter for OnlyVerifiedFilter {
    fn name(&self) -> &'static str {
        "only_verified"
    }
    fn order(&self) -> i32 {
        55
    }
    fn kind(&self) -> FilterKind {
        FilterKind::Preference
    }
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, ctx: &FilterContext<'a>) {
        if ctx.options.only_verified {
            qb.push(" profiles.is_verified = TRUE");
        } else {
            qb.push(" TRUE");
        }
    }
}

struct ActiveWithinFilter;
impl Filter for ActiveWithinFilter {
    fn name(&self) -> &'static str {
        "active_within"
    }
    fn order(&self) -> i32 {
        58
    }
    fn kind(&self) -> FilterKind {
        FilterKind::Preference
    }
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, ctx: &FilterContext<'a>) {
        match ctx.options.active_within_days {
            Some(days) => {
                qb.push(" profiles.last_active_at > NOW() - (")
                    .push_bind(days as f64)
                    .push(" * INTERVAL '1 day')");
            }
            None => {
                qb.push(" TRUE");
            }
        }
    }
}

struct DistanceFilter;
impl Filter for DistanceFilter {
    fn name(&self) -> &'static str {
        "distance"
    }
    fn order(&self) -> i32 {
        60
    }
    fn kind(&self) -> FilterKind {
        FilterKind::Dealbreaker
    }
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>, ctx: &FilterContext<'a>) {
        if ctx.requester.max_distance_km <= 0.0 {
            // No-op per spec: maxDistanceKm <= 0 disables the distance filter.
            qb.push(" TRUE");
            return;
        }
        let bbox = calculate_bounding_box(
            ctx.requester.latitude,
            ctx.requester.longitude,
            ctx.requester.max_distance_km,
        );
        qb.push(" profiles.latitude BETWEEN ")
            .push_bind(bbox.min_lat)
            .push(" AND ")
            .push_bind(bbox.max_lat)
            .push(" AND profiles.longitude BETWEEN ")
            .push_bind(bbox.min_lon)
            .push(" AND ")
            .push_bind(bbox.max_lon);
    }
}

/// Ordered, composable set of filters that stay pushed down to the store.
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Construct from an arbitrary filter set, sorting once by `order`.
    pub fn new(mut filters: Vec<Box<dyn Filter>>) -> Self {
        filters.sort_by_key(|f| f.order());
        Self { filters }
    }

    /// The required pipeline from spec §4.2 (orders 0,10,20,30,40,50,55,58,60).
    pub fn default_pipeline() -> Self {
        Self::new(vec![
            Box::new(SelfExclusionFilter),
            Box::new(ActiveFilter),
            Box::new(GenderFilter),
            Box::new(AgeRangeFilter),
            Box::new(ExcludeSwipedFilter),
            Box::new(ExcludeBlockedFilter),
            Box::new(OnlyVerifiedFilter),
            Box::new(ActiveWithinFilter),
            Box::new(DistanceFilter),
        ])
    }

    /// Execution-order trace for observability, without running anything.
    pub fn trace(&self) -> Vec<FilterTrace> {
        self.filters
            .iter()
            .map(|f| FilterTrace {
                name: f.name(),
                kind: f.kind(),
                order: f.order(),
            })
            .collect()
    }

    /// Build the `SELECT ... FROM profiles WHERE <predicates> LIMIT $n`
    /// query. Callers execute it once (`.build_query_as().fetch_all(pool)`);
    /// the pipeline itself never touches rows.
    pub fn build<'a>(&self, ctx: &FilterContext<'a>, limit: i64) -> QueryBuilder<'a, Postgres> {
        self.build_inner(ctx, None, limit)
    }

    /// Same as [`build`](Self::build), but additionally restricts the result
    /// to `candidate_ids`. The restriction is injected as a `WHERE`
    /// predicate *before* `ORDER BY`/`LIMIT` are emitted, so it composes
    /// with every other filter instead of trailing the finished query (used
    /// by the pre-computed strategy to re-validate a fixed row set against
    /// the same dealbreakers, spec §4.4).
    pub fn build_restricted_to_ids<'a>(
        &self,
        ctx: &FilterContext<'a>,
        candidate_ids: &[i64],
        limit: i64,
    ) -> QueryBuilder<'a, Postgres> {
        self.build_inner(ctx, Some(candidate_ids), limit)
    }

    fn build_inner<'a>(
        &self,
        ctx: &FilterContext<'a>,
        restrict_to_ids: Option<&[i64]>,
        limit: i64,
    ) -> QueryBuilder<'a, Postgres> {
        let mut qb: QueryBuilder<'a, Postgres> = QueryBuilder::new(
            "SELECT profiles.* FROM profiles",
        );
        let mut first = true;
        for filter in &self.filters {
            push_and(&mut qb, &mut first);
            filter.apply(&mut qb, ctx);
        }
        if let Some(ids) = restrict_to_ids {
            push_and(&mut qb, &mut first);
            if ids.is_empty() {
                qb.push(" FALSE");
            } else {
                qb.push(" profiles.user_id IN (");
                let mut list = qb.separated(", ");
                for id in ids {
                    list.push_bind(*id);
                }
                qb.push_unseparated(")");
            }
        }
        qb.push(" ORDER BY profiles.user_id ASC LIMIT ").push_bind(limit);
        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{DrinkingStatus, EducationLevel, SmokingStatus};
    use chrono::Utc;

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
            interests: vec![],
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

    #[test]
    fn pipeline_sorts_filters_ascending_by_order() {
        let pipeline = FilterPipeline::default_pipeline();
        let trace = pipeline.trace();
        let orders: Vec<i32> = trace.iter().map(|t| t.order).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
        assert_eq!(orders, vec![0, 10, 20, 30, 40, 50, 55, 58, 60]);
    }

    #[test]
    fn pipeline_never_touches_rows_only_extends_query() {
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

        let qb = pipeline.build(&ctx, 60);
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT profiles.* FROM profiles WHERE"));
        assert!(sql.contains("LIMIT"));
    }

    #[test]
    fn distance_filter_is_noop_when_max_distance_non_positive() {
        let mut requester = profile(1, "male", "female", 30);
        requester.max_distance_km = 0.0;
        let pipeline = FilterPipeline::new(vec![Box::new(DistanceFilter)]);
        let swiped = HashSet::new();
        let blocked = HashSet::new();
        let options = CandidateRequest::default();
        let ctx = FilterContext {
            requester: &requester,
            swiped_ids: &swiped,
            blocked_ids: &blocked,
            options: &options,
        };
        let qb = pipeline.build(&ctx, 10);
        assert!(qb.sql().contains("TRUE"));
        assert!(!qb.sql().contains("latitude BETWEEN"));
    }

    #[test]
    fn trace_reports_kind_and_name() {
        let pipeline = FilterPipeline::default_pipeline();
        let trace = pipeline.trace();
        assert_eq!(trace[0].name, "self_exclusion");
        assert_eq!(trace[0].kind, FilterKind::Dealbreaker);
        assert_eq!(trace.last().unwrap().name, "distance");
    }
}

//! Profile repository: the only place that issues SQL against `profiles`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::filters::{FilterContext, FilterPipeline};
use crate::models::Profile;
use crate::store::error::StoreError;

#[derive(Clone)]
pub struct ProfileRepo {
    pool: PgPool,
}

impl ProfileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, user_id: i64) -> Result<Option<Profile>, StoreError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    pub async fn get_required(&self, user_id: i64) -> Result<Profile, StoreError> {
        self.get(user_id)
            .await?
            .ok_or(StoreError::ProfileNotFound(user_id))
    }

    /// Run the filter pipeline against this repository's pool and return the
    /// surviving candidates, store-ordered (ascending user id).
    pub async fn candidates(
        &self,
        pipeline: &FilterPipeline,
        ctx: &FilterContext<'_>,
        limit: i64,
    ) -> Result<Vec<Profile>, StoreError> {
        let mut qb = pipeline.build(ctx, limit);
        let rows = qb.build_query_as::<Profile>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Fetch a fixed set of candidates by id, still subject to the filter
    /// pipeline's dealbreakers (used by the pre-computed strategy to
    /// re-validate rows before serving them, spec §4.4).
    pub async fn candidates_by_id(
        &self,
        pipeline: &FilterPipeline,
        ctx: &FilterContext<'_>,
        candidate_ids: &[i64],
    ) -> Result<Vec<Profile>, StoreError> {
        if candidate_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = pipeline.build_restricted_to_ids(ctx, candidate_ids, candidate_ids.len() as i64);
        let rows = qb.build_query_as::<Profile>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn count_active(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM profiles WHERE is_active = TRUE")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Active profiles ordered staleness-first for the background refresher
    /// (spec §4.6): no valid score row first, then oldest `calculated_at`,
    /// tie-broken by user id, resuming after `after_user_id`.
    pub async fn select_for_refresh(
        &self,
        only_active: bool,
        after_user_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Profile>, StoreError> {
        let mut qb = sqlx::QueryBuilder::new(
            r#"
            SELECT p.* FROM profiles p
            LEFT JOIN (
                SELECT user_id, MAX(calculated_at) AS calculated_at
                FROM precomputed_scores
                WHERE is_valid = TRUE
                GROUP BY user_id
            ) s ON s.user_id = p.user_id
            WHERE 1 = 1
            "#,
        );
        if only_active {
            qb.push(" AND p.is_active = TRUE");
        }
        if let Some(after) = after_user_id {
            qb.push(" AND p.user_id > ").push_bind(after);
        }
        qb.push(" ORDER BY (s.calculated_at IS NOT NULL), s.calculated_at ASC, p.user_id ASC");
        qb.push(" LIMIT ").push_bind(limit);

        let rows = qb.build_query_as::<Profile>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Active user ids in a stable order, for the daily-pick generator's
    /// adaptive batching (spec §4.7).
    pub async fn active_user_ids(&self) -> Result<Vec<i64>, StoreError> {
        let ids: Vec<(i64,)> =
            sqlx::query_as("SELECT user_id FROM profiles WHERE is_active = TRUE ORDER BY user_id ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    pub async fn update_last_active(&self, user_id: i64, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE profiles SET last_active_at = $1 WHERE user_id = $2")
            .bind(now)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_last_active_batch(
        &self,
        user_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("UPDATE profiles SET last_active_at = $1 WHERE user_id = ANY($2)")
            .bind(now)
            .bind(user_ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_desirability(&self, user_id: i64, score: f64) -> Result<(), StoreError> {
        sqlx::query("UPDATE profiles SET desirability_score = $1 WHERE user_id = $2")
            .bind(score)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Soft-delete: deactivate the profile (cascade account delete, spec §6).
    pub async fn soft_delete(&self, user_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE profiles SET is_active = FALSE WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

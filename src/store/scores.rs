//! PrecomputedScore repository (spec §4.3, §4.4, §4.6): directional
//! per-(userId, targetUserId) compatibility cache.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::compat::CompatibilityResult;
use crate::models::PrecomputedScore;
use crate::store::error::StoreError;

#[derive(Clone)]
pub struct ScoreRepo {
    pool: PgPool,
}

impl ScoreRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read-through: fresh valid row for the pair, if any (spec §4.3).
    pub async fn read_fresh(
        &self,
        user_id: i64,
        target_user_id: i64,
        ttl_hours: i64,
    ) -> Result<Option<PrecomputedScore>, StoreError> {
        let row = sqlx::query_as::<_, PrecomputedScore>(
            r#"
            SELECT * FROM precomputed_scores
            WHERE user_id = $1 AND target_user_id = $2
              AND is_valid = TRUE
              AND calculated_at > NOW() - ($3 || ' hours')::interval
            "#,
        )
        .bind(user_id)
        .bind(target_user_id)
        .bind(ttl_hours.to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Newest `limit` fresh, valid rows for a requester, ordered by
    /// `overallScore` descending (spec §4.4 pre-computed strategy step 2).
    pub async fn top_fresh_for_user(
        &self,
        user_id: i64,
        ttl_hours: i64,
        limit: i64,
    ) -> Result<Vec<PrecomputedScore>, StoreError> {
        let rows = sqlx::query_as::<_, PrecomputedScore>(
            r#"
            SELECT * FROM precomputed_scores
            WHERE user_id = $1
              AND is_valid = TRUE
              AND calculated_at > NOW() - ($2 || ' hours')::interval
            ORDER BY overall_score DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(ttl_hours.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Write-through upsert from a freshly computed compatibility result.
    pub async fn upsert(
        &self,
        user_id: i64,
        target_user_id: i64,
        result: &CompatibilityResult,
        calculated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO precomputed_scores
                (user_id, target_user_id, overall_score, location_score, age_score,
                 interests_score, education_score, lifestyle_score, activity_score,
                 calculated_at, is_valid)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE)
            ON CONFLICT (user_id, target_user_id) DO UPDATE SET
                overall_score = EXCLUDED.overall_score,
                location_score = EXCLUDED.location_score,
                age_score = EXCLUDED.age_score,
                interests_score = EXCLUDED.interests_score,
                education_score = EXCLUDED.education_score,
                lifestyle_score = EXCLUDED.lifestyle_score,
                activity_score = EXCLUDED.activity_score,
                calculated_at = EXCLUDED.calculated_at,
                is_valid = TRUE
            "#,
        )
        .bind(user_id)
        .bind(target_user_id)
        .bind(result.overall)
        .bind(result.sub_scores.location)
        .bind(result.sub_scores.age)
        .bind(result.sub_scores.interests)
        .bind(result.sub_scores.education)
        .bind(result.sub_scores.lifestyle)
        .bind(result.activity)
        .bind(calculated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Write-through upsert matching the refresher's own combination rule
    /// (spec §4.6 step 4c), which stores `compat` as `lifestyle_score`.
    pub async fn upsert_refresher_row(
        &self,
        user_id: i64,
        target_user_id: i64,
        compat: f64,
        activity: f64,
        overall_score: f64,
        calculated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO precomputed_scores
                (user_id, target_user_id, overall_score, location_score, age_score,
                 interests_score, education_score, lifestyle_score, activity_score,
                 calculated_at, is_valid)
            VALUES ($1, $2, $3, 0, 0, 0, 0, $4, $5, $6, TRUE)
            ON CONFLICT (user_id, target_user_id) DO UPDATE SET
                overall_score = EXCLUDED.overall_score,
                lifestyle_score = EXCLUDED.lifestyle_score,
                activity_score = EXCLUDED.activity_score,
                calculated_at = EXCLUDED.calculated_at,
                is_valid = TRUE
            "#,
        )
        .bind(user_id)
        .bind(target_user_id)
        .bind(overall_score)
        .bind(compat)
        .bind(activity)
        .bind(calculated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Invalidate all rows involving `target_user_id` as the target, on a
    /// new swipe event against them (spec §4.3 invalidation rule).
    pub async fn invalidate_for_target(&self, target_user_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE precomputed_scores SET is_valid = FALSE WHERE target_user_id = $1",
        )
        .bind(target_user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

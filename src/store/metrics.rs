//! AlgorithmMetric repository: periodic per-user rollups feeding the
//! desirability calculator (spec §4.1, §4.8).

use sqlx::PgPool;

use crate::models::AlgorithmMetric;
use crate::store::error::StoreError;

#[derive(Clone)]
pub struct MetricRepo {
    pool: PgPool,
}

impl MetricRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most recent rollup for a user, by `calculatedAt` (spec §4.8 batch
    /// recalculation step 1).
    pub async fn latest_for_user(&self, user_id: i64) -> Result<Option<AlgorithmMetric>, StoreError> {
        let row = sqlx::query_as::<_, AlgorithmMetric>(
            "SELECT * FROM algorithm_metrics WHERE user_id = $1 ORDER BY calculated_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Most recent rollup per user across a batch, in one round-trip.
    pub async fn latest_for_users(
        &self,
        user_ids: &[i64],
    ) -> Result<Vec<AlgorithmMetric>, StoreError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, AlgorithmMetric>(
            r#"
            SELECT DISTINCT ON (user_id) *
            FROM algorithm_metrics
            WHERE user_id = ANY($1)
            ORDER BY user_id, calculated_at DESC
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert(&self, metric: &AlgorithmMetric) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO algorithm_metrics
                (user_id, swipes_received, likes_received, matches_created,
                 suggestions_generated, success_rate, calculated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(metric.user_id)
        .bind(metric.swipes_received)
        .bind(metric.likes_received)
        .bind(metric.matches_created)
        .bind(metric.suggestions_generated)
        .bind(metric.success_rate)
        .bind(metric.calculated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

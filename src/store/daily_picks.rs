//! DailyPick repository (spec §4.4, §4.7): materialized per-user pick rows.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::DailyPick;
use crate::store::error::StoreError;

#[derive(Clone)]
pub struct DailyPickRepo {
    pool: PgPool,
}

impl DailyPickRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete expired rows; called at the start of each generator run
    /// (spec §4.7 step 1).
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM daily_picks WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Replace a user's picks for a fresh generation run: existing
    /// unexpired, unacted rows for this user are cleared first so ranks
    /// don't collide with a previous run's leftovers.
    pub async fn replace_for_user(
        &self,
        user_id: i64,
        picks: &[(i64, f64, i32)],
        generated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM daily_picks WHERE user_id = $1 AND acted = FALSE")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for (candidate_user_id, score, rank) in picks {
            sqlx::query(
                r#"
                INSERT INTO daily_picks
                    (user_id, candidate_user_id, score, rank, generated_at, expires_at, seen, acted)
                VALUES ($1, $2, $3, $4, $5, $6, FALSE, FALSE)
                ON CONFLICT (user_id, candidate_user_id) DO UPDATE SET
                    score = EXCLUDED.score,
                    rank = EXCLUDED.rank,
                    generated_at = EXCLUDED.generated_at,
                    expires_at = EXCLUDED.expires_at,
                    seen = FALSE,
                    acted = FALSE
                "#,
            )
            .bind(user_id)
            .bind(candidate_user_id)
            .bind(score)
            .bind(rank)
            .bind(generated_at)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Today's serveable picks, ordered by rank (spec §4.4 daily-pick
    /// strategy step 1): `expiresAt > now` and `acted = false`.
    pub async fn select_unexpired_unacted(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<DailyPick>, StoreError> {
        let rows = sqlx::query_as::<_, DailyPick>(
            r#"
            SELECT * FROM daily_picks
            WHERE user_id = $1 AND expires_at > $2 AND acted = FALSE
            ORDER BY rank ASC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count of unseen rows today, for `suggestionsRemaining` (spec §4.4
    /// daily-pick strategy step 3).
    pub async fn count_unseen(&self, user_id: i64, now: DateTime<Utc>) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM daily_picks WHERE user_id = $1 AND expires_at > $2 AND acted = FALSE AND seen = FALSE",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Mark a set of rows seen, exactly the ones served (spec §8).
    pub async fn mark_seen(&self, ids: &[i64]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("UPDATE daily_picks SET seen = TRUE WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Mark a (user, candidate) pick acted-on, e.g. after a like/pass.
    pub async fn mark_acted(&self, user_id: i64, candidate_user_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE daily_picks SET acted = TRUE WHERE user_id = $1 AND candidate_user_id = $2",
        )
        .bind(user_id)
        .bind(candidate_user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

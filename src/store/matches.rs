//! Match repository: symmetric pairs that have mutually accepted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{canonical_pair, Match};
use crate::store::error::StoreError;

#[derive(Clone)]
pub struct MatchRepo {
    pool: PgPool,
}

/// Aggregate figures for the match-statistics endpoint (spec §6).
#[derive(Debug, Clone, PartialEq)]
pub struct MatchStats {
    pub total_matches: i64,
    pub active_matches: i64,
    pub average_compatibility_score: Option<f64>,
    pub last_match_at: Option<DateTime<Utc>>,
    pub top_reasons: Vec<String>,
}

impl MatchRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Canonicalize the pair and upsert a Match row; a duplicate mutual
    /// match submission is idempotent (spec §6, §8).
    pub async fn record_mutual_match(
        &self,
        user_a: i64,
        user_b: i64,
        compatibility_score: Option<f64>,
        source: &str,
    ) -> Result<bool, StoreError> {
        let (user1_id, user2_id) = canonical_pair(user_a, user_b);

        let result = sqlx::query(
            r#"
            INSERT INTO matches (user1_id, user2_id, compatibility_score, created_at, match_source, is_active)
            VALUES ($1, $2, $3, NOW(), $4, TRUE)
            ON CONFLICT (user1_id, user2_id) DO NOTHING
            "#,
        )
        .bind(user1_id)
        .bind(user2_id)
        .bind(compatibility_score)
        .bind(source)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn stats_for_user(&self, user_id: i64) -> Result<MatchStats, StoreError> {
        let row: (i64, i64, Option<f64>, Option<DateTime<Utc>>) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total_matches,
                COUNT(*) FILTER (WHERE is_active) AS active_matches,
                AVG(compatibility_score) AS average_compatibility_score,
                MAX(created_at) AS last_match_at
            FROM matches
            WHERE user1_id = $1 OR user2_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let top_reasons: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT match_source
            FROM matches
            WHERE user1_id = $1 OR user2_id = $1
            GROUP BY match_source
            ORDER BY COUNT(*) DESC
            LIMIT 3
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(MatchStats {
            total_matches: row.0,
            active_matches: row.1,
            average_compatibility_score: row.2,
            last_match_at: row.3,
            top_reasons: top_reasons.into_iter().map(|(s,)| s).collect(),
        })
    }

    /// Delete all Match rows where either side equals the target user
    /// (spec §6 match-deletion endpoint). Returns the deleted count.
    pub async fn delete_for_user(&self, user_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM matches WHERE user1_id = $1 OR user2_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn get(&self, user_a: i64, user_b: i64) -> Result<Option<Match>, StoreError> {
        let (user1_id, user2_id) = canonical_pair(user_a, user_b);
        let m = sqlx::query_as::<_, Match>(
            "SELECT * FROM matches WHERE user1_id = $1 AND user2_id = $2",
        )
        .bind(user1_id)
        .bind(user2_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(m)
    }
}

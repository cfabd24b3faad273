//! UserInteraction repository: append-only swipe record (spec §4.1).
//!
//! Not used to exclude candidates — the live swiped-target exclusion set
//! comes from the external swipe service (spec §1, §6) — this table only
//! feeds desirability and health metrics.

use sqlx::PgPool;

use crate::models::{InteractionType, UserInteraction};
use crate::store::error::StoreError;

#[derive(Clone)]
pub struct InteractionRepo {
    pool: PgPool,
}

impl InteractionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        user_id: i64,
        target_user_id: i64,
        interaction_type: InteractionType,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_interactions (user_id, target_user_id, interaction_type, created_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(user_id)
        .bind(target_user_id)
        .bind(interaction_type)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn recent_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<UserInteraction>, StoreError> {
        let rows = sqlx::query_as::<_, UserInteraction>(
            "SELECT * FROM user_interactions WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Cascade delete on account deletion (spec §3 Profile lifecycle).
    pub async fn delete_for_user(&self, user_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM user_interactions WHERE user_id = $1 OR target_user_id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

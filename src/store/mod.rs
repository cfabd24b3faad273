//! The candidate store (spec §4.1, C1): exclusive owner of Profile, Match,
//! PrecomputedScore, DailyPick, UserInteraction, and AlgorithmMetric. Every
//! other component reaches these tables only through this module's
//! repositories.

pub mod daily_picks;
pub mod error;
pub mod interactions;
pub mod matches;
pub mod metrics;
pub mod profiles;
pub mod scores;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use daily_picks::DailyPickRepo;
pub use error::StoreError;
pub use interactions::InteractionRepo;
pub use matches::{MatchRepo, MatchStats};
pub use metrics::MetricRepo;
pub use profiles::ProfileRepo;
pub use scores::ScoreRepo;

/// Owns the connection pool and hands out one repository per table.
/// Repositories are cheap to clone (a `PgPool` is an `Arc` internally), so
/// callers can hold their own copy rather than borrowing from `Store`.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn profiles(&self) -> ProfileRepo {
        ProfileRepo::new(self.pool.clone())
    }

    pub fn matches(&self) -> MatchRepo {
        MatchRepo::new(self.pool.clone())
    }

    pub fn scores(&self) -> ScoreRepo {
        ScoreRepo::new(self.pool.clone())
    }

    pub fn daily_picks(&self) -> DailyPickRepo {
        DailyPickRepo::new(self.pool.clone())
    }

    pub fn interactions(&self) -> InteractionRepo {
        InteractionRepo::new(self.pool.clone())
    }

    pub fn metrics(&self) -> MetricRepo {
        MetricRepo::new(self.pool.clone())
    }

    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(true)
    }
}

use thiserror::Error;

/// Errors surfaced by the candidate store (spec §4.1, C1).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("profile not found for user {0}")]
    ProfileNotFound(i64),
}

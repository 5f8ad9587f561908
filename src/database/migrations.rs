//! # Schema Setup
//!
//! Migrations are embedded from the `migrations/` directory at build time and
//! applied in version order. Each one is written to be idempotent, so running
//! against an already-seeded database is safe.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies the embedded schema migrations.
pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Run all outstanding migrations
    pub async fn run_all(pool: &PgPool) -> Result<(), MigrateError> {
        MIGRATOR.run(pool).await?;
        info!(
            migrations = MIGRATOR.iter().count(),
            "Database schema is up to date"
        );
        Ok(())
    }
}

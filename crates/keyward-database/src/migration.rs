//! Schema migrations for the user store.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use keyward_core::error::{AppError, ErrorKind};

/// Migrations embedded from the workspace `migrations/` directory.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Brings the schema up to date. Already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let latest = MIGRATOR.iter().map(|m| m.version).max().unwrap_or_default();

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Schema migration failed: {e}"),
            e,
        )
    })?;

    info!(schema_version = latest, "User store schema up to date");
    Ok(())
}

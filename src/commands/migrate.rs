//! Database migration command.

use keyward_core::config::{AppConfig, RepositoryBackend};
use keyward_core::error::AppError;
use keyward_database::DatabasePool;

use crate::output::{self, OutputFormat};

/// Apply all pending migrations to the configured PostgreSQL database.
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    if config.database.backend == RepositoryBackend::Memory {
        output::print_success("In-memory backend selected; nothing to migrate.", format);
        return Ok(());
    }

    let pool = DatabasePool::connect(&config.database).await?;
    let result = keyward_database::migration::run_migrations(pool.pool()).await;
    pool.close().await;
    result?;

    output::print_success("All migrations applied successfully.", format);
    Ok(())
}

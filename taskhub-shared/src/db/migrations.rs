/// Database migration runner
///
/// Migrations live in `migrations/` at the workspace root. Each migration is
/// an up file (`{timestamp}_{name}.sql`) with a matching `.down.sql` for
/// rollback. They run automatically at server startup.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations
///
/// # Errors
///
/// Returns an error if a migration file is malformed or fails to execute;
/// failed migrations are rolled back where the statements allow it.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("Database migrations up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

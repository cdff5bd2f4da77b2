//! # Migrations
//!
//! The SQL under `migrations/sqlite/` is compiled into the binary and
//! applied by [`crate::Database::new`]. sqlx records each applied file in
//! `_sqlx_migrations` and skips it on later starts.
//!
//! Applied migrations are checksummed, so schema changes go in a new
//! `NNN_description.sql` file rather than an edit to an old one.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// `001_initial_schema.sql`: products, payment methods, transactions,
/// line items, refunds and stock adjustments, all keyed by `tenant_id`.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;
    info!("Schema up to date");
    Ok(())
}

/// `(embedded, applied)`. Errors on a database that was never migrated.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((MIGRATOR.migrations.len(), applied as usize))
}

//! # Connection Pool
//!
//! Opens the SQLite pool the ledger runs on and hands out tenant-scoped
//! units of work.
//!
//! ## Concurrency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 One pool, many concurrent units of work                 │
//! │                                                                         │
//! │  record_sale(tenant-a)   ──► db.begin() ──► conn 1 ─┐                   │
//! │  record_sale(tenant-a)   ──► db.begin() ──► conn 2 ─┼──► SQLite (WAL)   │
//! │  create_refund(tenant-b) ──► db.begin() ──► conn 3 ─┘                   │
//! │                                                                         │
//! │  Writers take turns on SQLite's single write lock. A unit that finds    │
//! │  the lock taken waits up to `busy_timeout` instead of failing.          │
//! │  Readers never wait for writers in WAL mode.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `:memory:` databases live and die with their connection, so
//! [`DbConfig::in_memory`] pins the pool to one connection. Code holding an
//! open [`TenantStore`] on such a pool must not call `begin` again.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::store::TenantStore;
use kahera_core::TenantId;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Pool and SQLite settings.
///
/// ```rust,ignore
/// let config = DbConfig::new("./data/kahera.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first connect. `:memory:` for a private
    /// in-memory database.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Connections kept open while idle. Default: 1
    pub min_connections: u32,

    /// How long `begin` waits for a free connection. Default: 30s
    pub connect_timeout: Duration,

    /// Idle connections above `min_connections` are closed after this.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// How long a writer waits for SQLite's write lock. Default: 5s
    pub busy_timeout: Duration,

    /// Apply embedded migrations when the pool opens. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A private in-memory database on a single connection. For tests.
    pub fn in_memory() -> Self {
        DbConfig::new(IN_MEMORY)
            .max_connections(1)
            .connect_timeout(Duration::from_secs(5))
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    /// Per-connection SQLite settings.
    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Off by default in SQLite; the schema relies on them
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
            .create_if_missing(true);

        Ok(options)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared database handle.
///
/// Cheap to clone (the pool is reference counted). Services receive one
/// explicitly instead of reaching for a process-wide global.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./kahera.db")).await?;
///
/// let mut store = db.begin(&tenant).await?;
/// let product = store.products().get(&product_id).await?;
/// store.commit().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, brings the schema up to date.
    ///
    /// ## Errors
    /// - `ConnectionFailed`: bad path, unwritable directory, locked file
    /// - `MigrationFailed`: an embedded migration did not apply
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            in_memory = config.is_in_memory(),
            "Opening database"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(
            max_connections = config.max_connections,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Pool ready"
        );

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Applies pending embedded migrations. Already-applied ones are skipped.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns `(embedded, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Opens a unit of work scoped to `tenant`.
    ///
    /// Every repository reachable from the returned store filters by this
    /// tenant. Nothing is written until [`TenantStore::commit`].
    pub async fn begin(&self, tenant: &TenantId) -> DbResult<TenantStore> {
        TenantStore::begin(&self.pool, tenant.clone()).await
    }

    /// Closes every connection. Later `begin` calls fail with
    /// `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// `true` if the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);

        let (embedded, applied) = db.migration_status().await.unwrap();
        assert!(embedded > 0);
        assert_eq!(embedded, applied);

        // Re-running is a no-op
        db.run_migrations().await.unwrap();
        assert_eq!(db.migration_status().await.unwrap(), (embedded, applied));
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/kahera-test.db")
            .max_connections(10)
            .min_connections(2)
            .busy_timeout(Duration::from_secs(1))
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());

        let memory = DbConfig::in_memory();
        assert!(memory.is_in_memory());
        assert_eq!(memory.max_connections, 1);
    }

    #[tokio::test]
    async fn test_closed_pool_refuses_work() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let tenant = TenantId::parse("tenant-a").unwrap();
        assert!(matches!(
            db.begin(&tenant).await,
            Err(DbError::ConnectionFailed(_))
        ));
        assert!(!db.health_check().await);
    }
}

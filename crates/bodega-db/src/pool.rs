//! # Database Handle
//!
//! Opens the SQLite file the sale engine writes to and hands out the
//! repositories and the [`SaleOrderService`] that share its pool.
//!
//! ## Request Scope
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every HTTP request borrows one pooled connection for its lifetime     │
//! │                                                                         │
//! │  PUT /api/sales/{id}/Emitido  ── conn A: BEGIN ... reconcile ... COMMIT │
//! │  POST /api/sales/Pendiente    ── conn B: BEGIN ... waits for the lock  │
//! │  GET /api/companies/{id}/sales ─ conn C: reads the last commit (WAL)   │
//! │                                                                         │
//! │  SQLite admits one writer at a time. A second sale transaction waits   │
//! │  up to `busy_timeout` for the first to finish, then fails and rolls    │
//! │  back as a DATABASE_ERROR.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Migrations under `migrations/sqlite` are applied every time a handle is
//! opened; applying them twice is a no-op.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::orders::{EngineSettings, SaleOrderService};
use crate::repository::directory::DirectoryRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::stock::StockRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how many requests may hold a connection.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Concurrent requests holding a connection. Default: 5
    pub max_connections: u32,

    /// Connections kept open while idle. Default: 1
    pub min_connections: u32,

    /// How long a request waits for a free connection. Default: 30 seconds
    pub acquire_timeout: Duration,

    /// Idle connections are closed after this. Default: 10 minutes
    pub idle_timeout: Duration,

    /// How long a sale transaction waits on another writer. Default: 5 seconds
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// A file-backed database, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// A private database for one test.
    ///
    /// Each SQLite connection to `:memory:` gets its own empty database, so
    /// the pool is pinned to a single connection. Code that runs inside a
    /// transaction must therefore use the transaction's connection, never
    /// the pool.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(1),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }
}

// =============================================================================
// Database
// =============================================================================

/// Cloneable handle over the shared pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the database and brings its schema up to date.
    ///
    /// Journal mode is WAL so history reads never wait on a sale
    /// transaction. Foreign keys are switched on; SQLite leaves them off.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Opening database"
        );

        if !config.is_in_memory() {
            if let Some(parent) = config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                }
            }
        }

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!("Pool ready, applying migrations");
        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    /// The raw pool, for transactions that span several stores.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Sale lookups (by id, company history).
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn stock(&self) -> StockRepository {
        StockRepository::new(self.pool.clone())
    }

    pub fn directory(&self) -> DirectoryRepository {
        DirectoryRepository::new(self.pool.clone())
    }

    /// The sale engine over this database.
    pub fn sale_orders(&self, settings: EngineSettings) -> SaleOrderService {
        SaleOrderService::new(self.pool.clone(), settings)
    }

    /// Returns `(total, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Waits for in-flight requests to release their connections, then closes.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// `true` when a trivial query succeeds.
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

        let (total, applied) = db.migration_status().await.unwrap();
        assert!(total > 0);
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_reopening_file_database_keeps_data() {
        let path = std::env::temp_dir()
            .join(format!("bodega-{}", uuid::Uuid::new_v4()))
            .join("bodega.db");

        let db = Database::new(DbConfig::new(path.clone())).await.unwrap();
        db.directory().create_company("Ferretería Sur").await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(path.clone()).max_connections(2))
            .await
            .unwrap();
        assert_eq!(db.directory().count_companies().await.unwrap(), 1);
        db.close().await;

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_memory_config_uses_one_connection() {
        let config = DbConfig::in_memory();
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);

        let config = DbConfig::new("./data/bodega.db").max_connections(8);
        assert!(!config.is_in_memory());
        assert_eq!(config.max_connections, 8);
    }
}

//! Database connection management using Diesel ORM.
//!
//! Every pooled connection enforces foreign keys and waits on a busy
//! database instead of failing immediately.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pragmas applied to every connection before use.
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// A connection checked out of a [`DbPool`].
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Debug, Clone, Copy)]
struct WarehousePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for WarehousePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(CONNECTION_PRAGMAS)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a connection pool for the given database URL.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(5)
        .connection_customizer(Box::new(WarehousePragmas))
        .build(manager)
        .map_err(|e| Error::Connection(e.to_string()))
}

/// Open a single configured connection outside any pool.
///
/// # Errors
/// Returns an error if the database cannot be opened.
pub fn establish(database_url: &str) -> Result<SqliteConnection> {
    let mut conn =
        SqliteConnection::establish(database_url).map_err(|e| Error::Connection(e.to_string()))?;
    configure_sqlite_connection(&mut conn)?;
    Ok(conn)
}

/// Apply the warehouse schema through a pooled connection.
///
/// Safe to run repeatedly; already-applied migrations are skipped.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
    run_migrations_on(&mut conn)
}

/// Apply the warehouse schema on one connection.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations_on(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Database(e.to_string()))?;
    if applied.is_empty() {
        debug!("Warehouse schema already up to date");
    } else {
        info!(migrations = applied.len(), "Warehouse schema applied");
    }
    Ok(())
}

/// Configure SQLite connection pragmas used for warehouse writes.
///
/// # Errors
/// Returns an error if a pragma fails to apply.
pub fn configure_sqlite_connection(conn: &mut SqliteConnection) -> Result<()> {
    conn.batch_execute(CONNECTION_PRAGMAS)
        .map_err(|e| Error::Database(e.to_string()))
}

/// Shared-cache in-memory pool with the schema applied, unique per call.
#[cfg(test)]
pub(crate) fn memory_pool() -> DbPool {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let url = format!("file:warehouse_test_{id}?mode=memory&cache=shared");
    let pool = create_pool(&url).expect("pool");
    run_migrations(&pool).expect("migrations");
    pool
}

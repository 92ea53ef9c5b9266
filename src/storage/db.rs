use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::core::error::{AppError, AppResult};
use crate::storage::migrations::run_migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Path that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and runs schema migrations.
/// An in-memory database (`":memory:"`) gets a single-connection pool so that every
/// caller sees the same data.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use steamdb_bot::storage::create_pool;
///
/// let pool = create_pool("steamdb.db")?;
/// # Ok::<(), steamdb_bot::core::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let (manager, max_size) = if database_path == IN_MEMORY {
        (SqliteConnectionManager::memory(), 1)
    } else {
        (SqliteConnectionManager::file(database_path), 10)
    };
    let manager = manager.with_init(|conn| conn.execute_batch("PRAGMA busy_timeout = 5000;"));

    let pool = Pool::builder().max_size(max_size).build(manager)?;

    // Ensure schema is up to date on first connection
    {
        let mut conn = pool.get()?;
        run_migrations(&mut conn).map_err(|e| AppError::Validation(format!("schema bootstrap failed: {:#}", e)))?;
    }
    log::info!("Database ready at {}", database_path);

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

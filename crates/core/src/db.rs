//! Database handle.
//!
//! [`Database`] owns the SQLite connection pool. It is built once by a binary (or a test) and
//! cloned into each service; there is no global pool.

use crate::{CoreConfig, RecordResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Cloneable handle over the SQLite connection pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect using the URL and pool size from configuration.
    ///
    /// Migrations are not applied; call [`Database::migrate`] when the schema may be behind.
    pub async fn connect(cfg: &CoreConfig) -> RecordResult<Self> {
        Self::connect_url(cfg.database_url(), cfg.max_connections()).await
    }

    /// Connect to an explicit SQLite URL.
    ///
    /// The database file is created when missing and foreign keys are enforced on every
    /// connection.
    pub async fn connect_url(url: &str, max_connections: u32) -> RecordResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        tracing::debug!("connected to database at {}", url);
        Ok(Self { pool })
    }

    /// Open a private in-memory database with the schema applied.
    ///
    /// The pool holds a single connection that is never recycled, otherwise each new
    /// connection would see its own empty database.
    pub async fn in_memory() -> RecordResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> RecordResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_database_has_schema() {
        let db = Database::in_memory().await.expect("in-memory db");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shared_records")
            .fetch_one(db.pool())
            .await
            .expect("shared_records table should exist");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_file_database_is_created_and_migrated_twice() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("medvault.db");
        let url = format!("sqlite://{}", path.display());

        let db = Database::connect_url(&url, 2)
            .await
            .expect("connect should create the file");
        db.migrate().await.expect("first migration run");
        db.migrate().await.expect("second migration run is a no-op");

        assert!(path.exists());
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .expect("users table should exist");
        assert_eq!(count, 0);
    }
}

//! SQLite persistence for video records and sync state.

mod migrations;
mod models;
mod queries;

pub use models::*;
pub use queries::*;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use tracing::info;

/// Handle to the video database. Cheap to clone; clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails, migrations fail, or the file
    /// is not writable.
    pub async fn new(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Concurrent page loads may each run a sync; writers queue instead of failing.
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to SQLite database at {}", path.display()))?;

        migrations::run(&pool).await?;
        info!(path = %path.display(), "Database migrations complete");

        let db = Self { pool };
        db.verify_writable(path).await?;

        Ok(db)
    }

    /// Fail fast on read-only mounts. `BEGIN` alone is deferred and succeeds
    /// on a read-only file, so this runs a no-op write and rolls it back.
    async fn verify_writable(&self, path: &Path) -> Result<()> {
        let not_writable = || {
            format!(
                "SQLite database is not writable (path: {}). Check volume permissions",
                path.display()
            )
        };

        let mut tx = self.pool.begin().await.with_context(not_writable)?;

        sqlx::query("UPDATE _schema_version SET version = version")
            .execute(&mut *tx)
            .await
            .with_context(not_writable)?;

        tx.rollback()
            .await
            .context("Failed to roll back SQLite writability check")?;
        Ok(())
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_verify_writable_rejects_read_only_database() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("videos.sqlite");
        let db = Database::new(&path).await.unwrap();
        db.verify_writable(&path).await.unwrap();
        db.pool().close().await;

        let options = SqliteConnectOptions::new().filename(&path).read_only(true);
        let read_only = Database {
            pool: SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await
                .unwrap(),
        };

        let err = read_only.verify_writable(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("not writable"));
    }
}

use anyhow::Result;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// DbConnection owns the SQLite pool and the schema bootstrap
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and set up the schema
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database {}", url);
            Sqlite::create_database(url).await?
        }

        let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a private in-memory database for a test
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // A single never-recycled connection keeps the in-memory database alive
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trackers (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                is_defined_period INTEGER NOT NULL DEFAULT 0,
                target_days INTEGER NOT NULL DEFAULT 0,
                start_date TEXT,
                end_date TEXT,
                streak INTEGER NOT NULL DEFAULT 0,
                longest_streak INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Every lookup is scoped by owner
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_trackers_owner_id
            ON trackers(owner_id, created_at);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tracker_marked_days (
                tracker_id TEXT NOT NULL,
                day TEXT NOT NULL,
                PRIMARY KEY (tracker_id, day),
                FOREIGN KEY (tracker_id) REFERENCES trackers (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

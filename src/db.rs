use std::time::Duration;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::error::{AppError, Result};

/// Record store connection pool wrapper. Built once at startup and shared
/// across requests; connection setup is bounded by the acquire timeout.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    table: String,
}

impl Database {
    /// Connect to the record store.
    pub async fn new(url: &str, table: &str) -> Result<Self> {
        validate_table_name(table)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;

        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Name of the file record table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the file record table if it does not exist. Records are
    /// write-once: there is no update or delete path.
    pub async fn run_migrations(&self) -> Result<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                blob_url TEXT NOT NULL,
                secret TEXT NOT NULL UNIQUE,
                filename TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
            self.table
        );

        sqlx::query(&sql).execute(&self.pool).await?;

        Ok(())
    }
}

// The table name is spliced into SQL text, so it must stay an identifier.
fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(AppError::Config(format!("invalid table name: {}", table)));
    }
    Ok(())
}

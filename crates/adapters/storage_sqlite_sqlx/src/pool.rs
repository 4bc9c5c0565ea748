//! Opening the `kv` database that backs bindings and weather snapshots.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::StorageError;

/// Where the key/value database lives.
pub struct Config {
    /// `SQLite` URL, `sqlite:sunshade.db?mode=rwc` on disk or `sqlite::memory:`.
    pub database_url: String,
}

impl Config {
    /// Open the database and bring the `kv` table up to date.
    ///
    /// A missing database file is created.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is invalid, the file cannot be
    /// opened or a migration fails.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::open(&self.database_url).await
    }
}

/// An open key/value database.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn open(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(connection_limit(database_url))
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(url = %database_url, "kv database ready");

        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Each connection to `:memory:` sees its own empty database, so an
/// in-memory store is limited to a single connection.
fn connection_limit(database_url: &str) -> u32 {
    if database_url.contains(":memory:") { 1 } else { 4 }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory() -> Database {
        Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn should_create_only_the_kv_table() {
        let db = memory().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|row| row.0.as_str()).collect();
        assert_eq!(names, vec!["kv"]);
    }

    #[tokio::test]
    async fn should_share_one_memory_database_across_queries() {
        let db = memory().await;

        sqlx::query("INSERT INTO kv (key, value) VALUES ('a', '1')")
            .execute(db.pool())
            .await
            .unwrap();
        let (value,): (String,) = sqlx::query_as("SELECT value FROM kv WHERE key = 'a'")
            .fetch_one(db.pool())
            .await
            .unwrap();

        assert_eq!(value, "1");
    }

    #[test]
    fn should_limit_memory_databases_to_one_connection() {
        assert_eq!(connection_limit("sqlite::memory:"), 1);
        assert_eq!(connection_limit("sqlite:sunshade.db?mode=rwc"), 4);
    }
}

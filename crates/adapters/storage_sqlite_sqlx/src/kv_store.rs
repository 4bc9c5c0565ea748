//! `SQLite` implementation of [`KeyValueStore`].

use std::future::Future;

use sqlx::SqlitePool;

use sunshade_app::ports::KeyValueStore;
use sunshade_domain::error::SunshadeError;

use crate::error::StorageError;

const SELECT_BY_KEY: &str = "SELECT value FROM kv WHERE key = ?";
const UPSERT: &str =
    "INSERT INTO kv (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// `SQLite`-backed key/value store.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, SunshadeError>> + Send {
        let pool = self.pool.clone();
        let key = key.to_string();
        async move {
            let row: Option<(String,)> = sqlx::query_as(SELECT_BY_KEY)
                .bind(key)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|(value,)| value))
        }
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        let pool = self.pool.clone();
        let key = key.to_string();
        async move {
            sqlx::query(UPSERT)
                .bind(key)
                .bind(value)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteKeyValueStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteKeyValueStore::new(db.pool().clone())
    }

    #[tokio::test]
    async fn should_return_none_for_missing_key() {
        let store = setup().await;
        assert_eq!(store.get("sunshade-0-sunrise").await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_return_stored_value() {
        let store = setup().await;
        store
            .set("sunshade-0-sunrise", r#"{"key":"sunshade-0-sunrise","job_id":1}"#.to_string())
            .await
            .unwrap();

        let value = store.get("sunshade-0-sunrise").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"key":"sunshade-0-sunrise","job_id":1}"#));
    }

    #[tokio::test]
    async fn should_overwrite_existing_value() {
        let store = setup().await;
        store.set("weather-snapshot", "a".to_string()).await.unwrap();
        store.set("weather-snapshot", "b".to_string()).await.unwrap();

        assert_eq!(
            store.get("weather-snapshot").await.unwrap().as_deref(),
            Some("b")
        );
    }
}

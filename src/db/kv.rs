use crate::db::SqlitePool;
use crate::error::CatalogError;

/// String values under string keys; the SQLite stand-in for a preferences file.
#[derive(Clone)]
pub struct KeyValueStorage {
    pool: SqlitePool,
}

impl KeyValueStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, CatalogError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM key_value WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            INSERT INTO key_value (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), CatalogError> {
        sqlx::query("DELETE FROM key_value WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

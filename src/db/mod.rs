//! Local cache: SQLite tables for characters, favourites and key-value blobs.
//!
//! Layout:
//! - `schema.rs`: SQL DDL applied at startup
//! - `models.rs`: structs mirroring DB rows and their domain conversions
//! - `sqlite.rs`: character and favourites storages (the cache ports)
//! - `kv.rs`: key-value storage backing the settings record
//! - `observer.rs`: per-table change notification for live queries

pub mod kv;
pub mod models;
pub mod observer;
pub mod schema;
pub mod sqlite;

pub use kv::KeyValueStorage;
pub use models::{CharacterEntity, FavouriteEntity};
pub use observer::TableObserver;
pub use schema::SQLITE_INIT;
pub use sqlite::{CharacterStorage, FavouritesStorage};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::CatalogError;

pub type SqlitePool = Pool<Sqlite>;

/// Shared pool plus the change observers of each table. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    characters: TableObserver,
    favourites: TableObserver,
}

/// Open (creating if needed) the database at `database_url` and apply the schema.
pub async fn connect(database_url: &str) -> Result<Database, CatalogError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    // Each in-memory connection is its own database; keep a single one.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 4 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_opts)
        .await?;
    let db = Database::new(pool);
    db.init_schema().await?;
    info!(database_url, "local cache ready");
    Ok(db)
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            characters: TableObserver::new("characters"),
            favourites: TableObserver::new("favourites"),
        }
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), CatalogError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        debug!("schema applied");
        Ok(())
    }

    pub fn characters(&self) -> CharacterStorage {
        CharacterStorage::new(self.pool.clone(), self.characters.clone())
    }

    pub fn favourites(&self) -> FavouritesStorage {
        FavouritesStorage::new(self.pool.clone(), self.favourites.clone())
    }

    pub fn key_value(&self) -> KeyValueStorage {
        KeyValueStorage::new(self.pool.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

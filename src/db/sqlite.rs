use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::{QueryBuilder, Sqlite};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use crate::db::models::{CharacterEntity, FavouriteEntity};
use crate::db::observer::TableObserver;
use crate::db::SqlitePool;
use crate::domain::{
    Character, CharacterFilters, CharacterId, CharacterLocalRepository, FavouritesRepository,
};
use crate::error::CatalogError;

const SELECT_CHARACTERS: &str = r#"SELECT id, name, life_status, species, subtype, gender,
    origin_name, origin_id, current_location_name, current_location_id,
    image_url, episode_ids, api_url, created_at, next_key
    FROM characters"#;

/// Appends a `WHERE` clause for the non-empty filter fields.
fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filters: &CharacterFilters) {
    let f = filters.clone().normalized();
    qb.push(" WHERE 1 = 1");
    if let Some(name) = f.name {
        qb.push(" AND name LIKE '%' || ").push_bind(name).push(" || '%'");
    }
    if let Some(status) = f.status {
        qb.push(" AND life_status = ").push_bind(status.as_str());
    }
    if let Some(species) = f.species {
        qb.push(" AND species = ").push_bind(species);
    }
    if let Some(subtype) = f.subtype {
        qb.push(" AND subtype = ").push_bind(subtype);
    }
    if let Some(gender) = f.gender {
        qb.push(" AND gender = ").push_bind(gender.as_str());
    }
}

#[derive(Clone)]
pub struct CharacterStorage {
    pool: SqlitePool,
    observer: TableObserver,
}

impl CharacterStorage {
    pub fn new(pool: SqlitePool, observer: TableObserver) -> Self {
        Self { pool, observer }
    }

    /// Every row matching `filters`, ordered by id.
    pub async fn query(&self, filters: &CharacterFilters) -> Result<Vec<Character>, CatalogError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_CHARACTERS);
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY id");
        let rows = qb
            .build_query_as::<CharacterEntity>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Character::from).collect())
    }
}

#[async_trait]
impl CharacterLocalRepository for CharacterStorage {
    /// Batch upsert in a single transaction; `INSERT OR REPLACE` replaces the whole row.
    async fn upsert(&self, characters: &[Character]) -> Result<(), CatalogError> {
        if characters.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for c in characters {
            let e = CharacterEntity::from(c);
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO characters (
                    id, name, life_status, species, subtype, gender,
                    origin_name, origin_id, current_location_name, current_location_id,
                    image_url, episode_ids, api_url, created_at, next_key
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(e.id)
            .bind(e.name)
            .bind(e.life_status)
            .bind(e.species)
            .bind(e.subtype)
            .bind(e.gender)
            .bind(e.origin_name)
            .bind(e.origin_id)
            .bind(e.current_location_name)
            .bind(e.current_location_id)
            .bind(e.image_url)
            .bind(e.episode_ids)
            .bind(e.api_url)
            .bind(e.created_at)
            .bind(e.next_key)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!(count = characters.len(), "characters upserted");
        self.observer.notify();
        Ok(())
    }

    async fn delete(&self, ids: &[CharacterId]) -> Result<u64, CatalogError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM characters WHERE id IN (");
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(i64::from(*id));
        }
        sep.push_unseparated(")");
        let affected = qb.build().execute(&self.pool).await?.rows_affected();
        self.observer.notify();
        Ok(affected)
    }

    async fn clear(&self) -> Result<u64, CatalogError> {
        let affected = sqlx::query("DELETE FROM characters")
            .execute(&self.pool)
            .await?
            .rows_affected();
        self.observer.notify();
        Ok(affected)
    }

    async fn clear_except_favourites(&self) -> Result<u64, CatalogError> {
        let affected =
            sqlx::query("DELETE FROM characters WHERE id NOT IN (SELECT id FROM favourites)")
                .execute(&self.pool)
                .await?
                .rows_affected();
        self.observer.notify();
        Ok(affected)
    }

    async fn count(&self) -> Result<u64, CatalogError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM characters")
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as u64)
    }

    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>, CatalogError> {
        let row = sqlx::query_as::<_, CharacterEntity>(&format!("{SELECT_CHARACTERS} WHERE id = ?"))
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Character::from))
    }

    async fn get_many(&self, ids: &[CharacterId]) -> Result<Vec<Character>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_CHARACTERS);
        qb.push(" WHERE id IN (");
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(i64::from(*id));
        }
        sep.push_unseparated(") ORDER BY id");
        let rows = qb
            .build_query_as::<CharacterEntity>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Character::from).collect())
    }

    async fn get_page(
        &self,
        filters: &CharacterFilters,
        after: CharacterId,
        up_to: Option<CharacterId>,
        limit: u64,
    ) -> Result<Vec<Character>, CatalogError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_CHARACTERS);
        push_filters(&mut qb, filters);
        qb.push(" AND id > ").push_bind(i64::from(after));
        if let Some(up_to) = up_to {
            qb.push(" AND id <= ").push_bind(i64::from(up_to));
        }
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        let rows = qb
            .build_query_as::<CharacterEntity>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Character::from).collect())
    }

    fn observe_changes(&self) -> BoxStream<'static, ()> {
        WatchStream::new(self.observer.subscribe())
            .map(|_| ())
            .boxed()
    }

    fn observe(
        &self,
        filters: CharacterFilters,
    ) -> BoxStream<'static, Result<Vec<Character>, CatalogError>> {
        let storage = self.clone();
        self.observe_changes()
            .then(move |_| {
                let storage = storage.clone();
                let filters = filters.clone();
                async move { storage.query(&filters).await }
            })
            .boxed()
    }
}

#[derive(Clone)]
pub struct FavouritesStorage {
    pool: SqlitePool,
    observer: TableObserver,
}

impl FavouritesStorage {
    pub fn new(pool: SqlitePool, observer: TableObserver) -> Self {
        Self { pool, observer }
    }
}

#[async_trait]
impl FavouritesRepository for FavouritesStorage {
    async fn add_to_favourites(&self, id: CharacterId) -> Result<(), CatalogError> {
        sqlx::query("INSERT OR IGNORE INTO favourites (id) VALUES (?)")
            .bind(i64::from(id))
            .execute(&self.pool)
            .await?;
        debug!(id, "added to favourites");
        self.observer.notify();
        Ok(())
    }

    async fn remove_from_favourites(&self, id: CharacterId) -> Result<(), CatalogError> {
        sqlx::query("DELETE FROM favourites WHERE id = ?")
            .bind(i64::from(id))
            .execute(&self.pool)
            .await?;
        debug!(id, "removed from favourites");
        self.observer.notify();
        Ok(())
    }

    async fn favourites(&self) -> Result<Vec<CharacterId>, CatalogError> {
        let rows = sqlx::query_as::<_, FavouriteEntity>("SELECT id FROM favourites ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CharacterId::from).collect())
    }

    fn observe_favourites(&self) -> BoxStream<'static, Result<Vec<CharacterId>, CatalogError>> {
        let storage = self.clone();
        WatchStream::new(self.observer.subscribe())
            .then(move |_| {
                let storage = storage.clone();
                async move { storage.favourites().await }
            })
            .boxed()
    }
}

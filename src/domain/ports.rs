//! Contracts the presentation layer consumes. Implementations live in
//! `service` (remote, settings, connectivity) and `db` (cache, favourites).

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::sync::watch;

use super::filters::CharacterFilters;
use super::model::{Character, CharacterId, PaginationInfo, Settings};
use crate::error::CatalogError;

pub type CharacterPage = (PaginationInfo, Vec<Character>);

#[async_trait]
pub trait CharacterRemoteRepository: Send + Sync {
    /// One 1-based page of the list endpoint. "Nothing matched" is an empty
    /// page, not an error.
    async fn get_characters(
        &self,
        filters: &CharacterFilters,
        page: u32,
    ) -> Result<CharacterPage, CatalogError>;

    async fn get_character(&self, id: CharacterId) -> Result<Character, CatalogError>;
}

#[async_trait]
pub trait CharacterLocalRepository: Send + Sync {
    /// Replace-on-conflict batch insert.
    async fn upsert(&self, characters: &[Character]) -> Result<(), CatalogError>;

    async fn delete(&self, ids: &[CharacterId]) -> Result<u64, CatalogError>;

    async fn clear(&self) -> Result<u64, CatalogError>;

    /// Clear everything that is not in the favourites table.
    async fn clear_except_favourites(&self) -> Result<u64, CatalogError>;

    async fn count(&self) -> Result<u64, CatalogError>;

    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>, CatalogError>;

    async fn get_many(&self, ids: &[CharacterId]) -> Result<Vec<Character>, CatalogError>;

    /// Up to `limit` matching rows with ids above `after` (and not above
    /// `up_to`, when given), ordered by id.
    async fn get_page(
        &self,
        filters: &CharacterFilters,
        after: CharacterId,
        up_to: Option<CharacterId>,
        limit: u64,
    ) -> Result<Vec<Character>, CatalogError>;

    /// Ticks once immediately, then after every write to the characters table.
    fn observe_changes(&self) -> BoxStream<'static, ()>;

    /// Emits the current match set immediately, then again after every write
    /// to the characters table.
    fn observe(
        &self,
        filters: CharacterFilters,
    ) -> BoxStream<'static, Result<Vec<Character>, CatalogError>>;
}

#[async_trait]
pub trait FavouritesRepository: Send + Sync {
    async fn add_to_favourites(&self, id: CharacterId) -> Result<(), CatalogError>;

    async fn remove_from_favourites(&self, id: CharacterId) -> Result<(), CatalogError>;

    async fn favourites(&self) -> Result<Vec<CharacterId>, CatalogError>;

    fn observe_favourites(&self) -> BoxStream<'static, Result<Vec<CharacterId>, CatalogError>>;
}

pub type SettingsUpdate = Box<dyn FnOnce(Settings) -> Settings + Send>;

#[async_trait]
pub trait SettingsManager: Send + Sync {
    fn settings(&self) -> Settings;

    fn subscribe(&self) -> watch::Receiver<Settings>;

    /// Apply `update` to the current value, persist it and publish the stored result.
    async fn save(&self, update: SettingsUpdate) -> Result<Settings, CatalogError>;
}

#[async_trait]
pub trait ConnectivityChecker: Send + Sync {
    async fn is_internet_available(&self) -> bool;
}

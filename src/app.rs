//! Wiring: builds every repository once and opens screens on top of them.

use std::sync::Arc;
use tracing::info;

use crate::api::CharacterApi;
use crate::config::Config;
use crate::db::{self, Database};
use crate::domain::{
    CharacterFilters, CharacterId, CharacterLocalRepository, CharacterRemoteRepository,
    ConnectivityChecker, FavouritesRepository, SettingsManager,
};
use crate::error::CatalogError;
use crate::presentation::{
    CharacterViewModel, CharactersViewModel, FavouritesViewModel, FiltersViewModel,
    NavRootViewModel, Navigator, ProfileViewModel, ScreenHandle, SettingsViewModel,
};
use crate::service::{
    ApiCharacterRepository, CharacterPager, FetchCharacterData, HttpConnectivityChecker,
    KvSettingsManager, StaticConnectivity,
};

#[derive(Clone)]
pub struct AppContainer {
    config: Config,
    db: Database,
    pub local: Arc<dyn CharacterLocalRepository>,
    pub remote: Arc<dyn CharacterRemoteRepository>,
    pub favourites: Arc<dyn FavouritesRepository>,
    pub settings: Arc<dyn SettingsManager>,
    pub connectivity: Arc<dyn ConnectivityChecker>,
}

impl AppContainer {
    pub async fn build(config: Config) -> Result<Self, CatalogError> {
        let db = db::connect(&config.database_url).await?;
        let api = CharacterApi::new(&config)?;
        let connectivity: Arc<dyn ConnectivityChecker> = if config.offline {
            Arc::new(StaticConnectivity::new(false))
        } else {
            Arc::new(HttpConnectivityChecker::new(
                api.client().clone(),
                api.base_url().clone(),
                config.probe_timeout(),
            ))
        };
        info!(
            api = %config.api_base_url,
            offline = config.offline,
            page_size = config.page_size,
            "app container built"
        );
        Self::assemble(
            config,
            db,
            Arc::new(ApiCharacterRepository::new(api)),
            connectivity,
        )
        .await
    }

    /// Wire the container from an open database and an explicit remote side.
    pub async fn assemble(
        config: Config,
        db: Database,
        remote: Arc<dyn CharacterRemoteRepository>,
        connectivity: Arc<dyn ConnectivityChecker>,
    ) -> Result<Self, CatalogError> {
        let settings = KvSettingsManager::load(db.key_value()).await?;
        Ok(Self {
            local: Arc::new(db.characters()),
            favourites: Arc::new(db.favourites()),
            settings: Arc::new(settings),
            remote,
            connectivity,
            config,
            db,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn fetch_character(&self) -> FetchCharacterData {
        FetchCharacterData::new(
            self.remote.clone(),
            self.local.clone(),
            self.connectivity.clone(),
        )
    }

    pub fn pager(&self, filters: CharacterFilters) -> CharacterPager {
        CharacterPager::new(
            self.local.clone(),
            self.remote.clone(),
            self.connectivity.clone(),
            filters,
            self.config.page_size,
        )
    }

    pub async fn open_nav_root(&self) -> Result<ScreenHandle<NavRootViewModel>, CatalogError> {
        ScreenHandle::open(NavRootViewModel::new(self.settings.clone())).await
    }

    pub async fn open_characters(
        &self,
        navigator: Navigator,
        filters: CharacterFilters,
    ) -> Result<ScreenHandle<CharactersViewModel>, CatalogError> {
        ScreenHandle::open(CharactersViewModel::new(
            self.local.clone(),
            self.remote.clone(),
            self.connectivity.clone(),
            self.favourites.clone(),
            self.settings.clone(),
            navigator,
            self.config.page_size,
            filters,
        ))
        .await
    }

    pub async fn open_filters(
        &self,
        current: CharacterFilters,
    ) -> Result<ScreenHandle<FiltersViewModel>, CatalogError> {
        ScreenHandle::open(FiltersViewModel::new(current)).await
    }

    pub async fn open_character(
        &self,
        id: CharacterId,
        navigator: Navigator,
    ) -> Result<ScreenHandle<CharacterViewModel>, CatalogError> {
        ScreenHandle::open(CharacterViewModel::new(
            id,
            self.fetch_character(),
            self.settings.clone(),
            navigator,
        ))
        .await
    }

    pub async fn open_favourites(
        &self,
        navigator: Navigator,
    ) -> Result<ScreenHandle<FavouritesViewModel>, CatalogError> {
        ScreenHandle::open(FavouritesViewModel::new(
            self.local.clone(),
            self.favourites.clone(),
            navigator,
        ))
        .await
    }

    pub async fn open_profile(&self) -> Result<ScreenHandle<ProfileViewModel>, CatalogError> {
        ScreenHandle::open(ProfileViewModel::new(
            self.fetch_character(),
            self.settings.clone(),
        ))
        .await
    }

    pub async fn open_settings(&self) -> Result<ScreenHandle<SettingsViewModel>, CatalogError> {
        ScreenHandle::open(SettingsViewModel::new(self.settings.clone())).await
    }

    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use super::navigation::{NavRootIntent, Navigator, Screen};
use super::screen::{ScreenScope, ViewModel};
use crate::domain::{
    Character, CharacterFilters, CharacterId, CharacterLocalRepository,
    CharacterRemoteRepository, ConnectivityChecker, FavouritesRepository, Settings,
    SettingsManager,
};
use crate::error::CatalogError;
use crate::service::CharacterPager;

#[derive(Debug, Clone, PartialEq)]
pub struct CharactersState {
    pub settings: Settings,
    pub filters: CharacterFilters,
    pub is_filter_sheet_visible: bool,
    pub favourites: Vec<CharacterId>,
    pub characters: Vec<Character>,
    pub is_loading: bool,
    pub end_of_data: bool,
    pub error: Option<String>,
    /// The last failure came from the network or the API, so reloading may help.
    pub can_retry: bool,
    pub data_is_empty: bool,
}

impl CharactersState {
    pub fn is_favourite(&self, id: CharacterId) -> bool {
        self.favourites.contains(&id)
    }

    pub fn is_my_character(&self, id: CharacterId) -> bool {
        self.settings.your_character_id == Some(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CharactersIntent {
    Refresh,
    LoadMore,
    ClickToCharacter(CharacterId),
    ApplyFilters(CharacterFilters),
    ChangeFilterVisibility(bool),
    ChangeIsFavourite(CharacterId),
    SetIsMyCharacter(CharacterId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CharactersEffect {
    /// The list was restarted from its first page.
    Refreshed,
    ShowError(String),
}

pub struct CharactersViewModel {
    local: Arc<dyn CharacterLocalRepository>,
    remote: Arc<dyn CharacterRemoteRepository>,
    connectivity: Arc<dyn ConnectivityChecker>,
    favourites: Arc<dyn FavouritesRepository>,
    settings: Arc<dyn SettingsManager>,
    navigator: Navigator,
    page_size: u32,
    initial_filters: CharacterFilters,
    pager: Option<CharacterPager>,
}

impl CharactersViewModel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        local: Arc<dyn CharacterLocalRepository>,
        remote: Arc<dyn CharacterRemoteRepository>,
        connectivity: Arc<dyn ConnectivityChecker>,
        favourites: Arc<dyn FavouritesRepository>,
        settings: Arc<dyn SettingsManager>,
        navigator: Navigator,
        page_size: u32,
        initial_filters: CharacterFilters,
    ) -> Self {
        Self {
            local,
            remote,
            connectivity,
            favourites,
            settings,
            navigator,
            page_size,
            initial_filters: initial_filters.normalized(),
            pager: None,
        }
    }

    async fn refresh(&mut self, scope: &ScreenScope<Self>) {
        let filters = scope.state().filters;
        scope.update(|s| {
            s.is_loading = true;
            s.error = None;
            s.can_retry = false;
        });
        scope.emit(CharactersEffect::Refreshed);

        let mut pager = CharacterPager::new(
            self.local.clone(),
            self.remote.clone(),
            self.connectivity.clone(),
            filters,
            self.page_size,
        );
        let result = pager.refresh().await;
        self.pager = Some(pager);
        match result {
            Ok(page) => scope.update(|s| {
                s.data_is_empty = page.items.is_empty();
                s.characters = page.items;
                s.end_of_data = page.end_of_data;
                s.is_loading = false;
            }),
            Err(e) => self.fail(scope, e),
        }
    }

    async fn load_more(&mut self, scope: &ScreenScope<Self>) {
        let Some(pager) = self.pager.as_mut() else {
            return self.refresh(scope).await;
        };
        if pager.end_reached() {
            return;
        }
        scope.update(|s| {
            s.is_loading = true;
            s.error = None;
            s.can_retry = false;
        });
        match pager.load_next().await {
            Ok(page) => scope.update(|s| {
                s.characters.extend(page.items);
                s.data_is_empty = s.characters.is_empty();
                s.end_of_data = page.end_of_data;
                s.is_loading = false;
            }),
            Err(e) => self.fail(scope, e),
        }
    }

    fn fail(&self, scope: &ScreenScope<Self>, e: CatalogError) {
        warn!(error = %e, "character list load failed");
        let message = e.to_string();
        let can_retry = e.is_remote();
        scope.update(|s| {
            s.is_loading = false;
            s.error = Some(message.clone());
            s.can_retry = can_retry;
        });
        scope.emit(CharactersEffect::ShowError(message));
    }

    async fn toggle_favourite(&self, id: CharacterId, scope: &ScreenScope<Self>) {
        let result = if scope.state().is_favourite(id) {
            self.favourites.remove_from_favourites(id).await
        } else {
            self.favourites.add_to_favourites(id).await
        };
        let result = match result {
            Ok(()) => self.favourites.favourites().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(ids) => scope.update(|s| s.favourites = ids),
            Err(e) => scope.emit(CharactersEffect::ShowError(e.to_string())),
        }
    }

    async fn toggle_my_character(&self, id: CharacterId, scope: &ScreenScope<Self>) {
        let update = Box::new(move |mut settings: Settings| {
            settings.your_character_id = if settings.your_character_id == Some(id) {
                None
            } else {
                Some(id)
            };
            settings
        });
        match self.settings.save(update).await {
            Ok(settings) => scope.update(|s| s.settings = settings),
            Err(e) => scope.emit(CharactersEffect::ShowError(e.to_string())),
        }
    }
}

#[async_trait]
impl ViewModel for CharactersViewModel {
    type Intent = CharactersIntent;
    type State = CharactersState;
    type Effect = CharactersEffect;

    const NAME: &'static str = "characters";

    fn initial_state(&self) -> CharactersState {
        CharactersState {
            settings: self.settings.settings(),
            filters: self.initial_filters.clone(),
            is_filter_sheet_visible: false,
            favourites: Vec::new(),
            characters: Vec::new(),
            is_loading: false,
            end_of_data: false,
            error: None,
            can_retry: false,
            data_is_empty: false,
        }
    }

    async fn on_open(&mut self, scope: &ScreenScope<Self>) {
        scope.collect(
            WatchStream::new(self.settings.subscribe()),
            |state: &mut CharactersState, settings: Settings| state.settings = settings,
        );
        match self.favourites.favourites().await {
            Ok(ids) => scope.update(|s| s.favourites = ids),
            Err(e) => warn!(error = %e, "failed to read favourites"),
        }
        scope.collect(
            self.favourites
                .observe_favourites()
                .filter_map(|ids| async move { ids.ok() }),
            |state: &mut CharactersState, ids: Vec<CharacterId>| state.favourites = ids,
        );
        self.refresh(scope).await;
    }

    async fn handle(&mut self, intent: CharactersIntent, scope: &ScreenScope<Self>) {
        match intent {
            CharactersIntent::Refresh => self.refresh(scope).await,
            CharactersIntent::LoadMore => self.load_more(scope).await,
            CharactersIntent::ClickToCharacter(id) => {
                self.navigator
                    .send(NavRootIntent::NavigateToScreen(Screen::Character(id)));
            }
            CharactersIntent::ApplyFilters(filters) => {
                let filters = filters.normalized();
                debug!(?filters, "filters applied");
                scope.update(|s| {
                    s.filters = filters;
                    s.is_filter_sheet_visible = false;
                });
                self.refresh(scope).await;
            }
            CharactersIntent::ChangeFilterVisibility(visible) => {
                scope.update(|s| s.is_filter_sheet_visible = visible);
            }
            CharactersIntent::ChangeIsFavourite(id) => self.toggle_favourite(id, scope).await,
            CharactersIntent::SetIsMyCharacter(id) => self.toggle_my_character(id, scope).await,
        }
    }
}

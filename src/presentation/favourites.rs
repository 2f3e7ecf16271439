use async_trait::async_trait;
use futures::{StreamExt, stream};
use std::sync::Arc;
use tracing::warn;

use super::navigation::{NavRootIntent, Navigator, Screen};
use super::screen::{ScreenScope, ViewModel};
use crate::domain::{Character, CharacterId, CharacterLocalRepository, FavouritesRepository};
use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FavouritesState {
    pub characters: Vec<Character>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FavouritesIntent {
    ClickToCharacter(CharacterId),
    RemoveFromFavourites(CharacterId),
}

/// Favourite characters as currently cached, kept in sync with the
/// favourites and characters tables.
pub struct FavouritesViewModel {
    local: Arc<dyn CharacterLocalRepository>,
    favourites: Arc<dyn FavouritesRepository>,
    navigator: Navigator,
}

impl FavouritesViewModel {
    pub fn new(
        local: Arc<dyn CharacterLocalRepository>,
        favourites: Arc<dyn FavouritesRepository>,
        navigator: Navigator,
    ) -> Self {
        Self {
            local,
            favourites,
            navigator,
        }
    }
}

#[async_trait]
impl ViewModel for FavouritesViewModel {
    type Intent = FavouritesIntent;
    type State = FavouritesState;
    type Effect = ();

    const NAME: &'static str = "favourites";

    fn initial_state(&self) -> FavouritesState {
        FavouritesState {
            is_loading: true,
            ..FavouritesState::default()
        }
    }

    async fn on_open(&mut self, scope: &ScreenScope<Self>) {
        let local = self.local.clone();
        let favourites = self.favourites.clone();
        // A favourite's row may be cached after it was marked, so both tables matter.
        let changes = stream::select(
            self.favourites.observe_favourites().map(|_| ()),
            self.local.observe_changes(),
        );
        let characters = changes.then(move |()| {
            let local = local.clone();
            let favourites = favourites.clone();
            async move {
                let ids = favourites.favourites().await?;
                local.get_many(&ids).await
            }
        });
        scope.collect(
            characters,
            |state: &mut FavouritesState, loaded: Result<Vec<Character>, CatalogError>| {
                state.is_loading = false;
                match loaded {
                    Ok(characters) => {
                        state.characters = characters;
                        state.error = None;
                    }
                    Err(e) => {
                        warn!(error = %e, "favourites load failed");
                        state.error = Some(e.to_string());
                    }
                }
            },
        );
    }

    async fn handle(&mut self, intent: FavouritesIntent, scope: &ScreenScope<Self>) {
        match intent {
            FavouritesIntent::ClickToCharacter(id) => {
                self.navigator
                    .send(NavRootIntent::NavigateToScreen(Screen::Character(id)));
            }
            FavouritesIntent::RemoveFromFavourites(id) => {
                if let Err(e) = self.favourites.remove_from_favourites(id).await {
                    scope.update(|s| s.error = Some(e.to_string()));
                    return;
                }
                // Keep the list consistent without waiting for the observer.
                scope.update(|s| s.characters.retain(|c| c.id != id));
            }
        }
    }
}

use async_trait::async_trait;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;

use super::navigation::{NavRootIntent, Navigator};
use super::screen::{ScreenScope, ViewModel};
use crate::domain::{Character, CharacterId, Settings, SettingsManager};
use crate::service::FetchCharacterData;

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterState {
    pub id: CharacterId,
    pub settings: Settings,
    pub character: Option<Character>,
    pub is_loading: bool,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CharacterIntent {
    FetchData,
    Back,
}

/// Detail screen for one character.
pub struct CharacterViewModel {
    id: CharacterId,
    fetch: FetchCharacterData,
    settings: Arc<dyn SettingsManager>,
    navigator: Navigator,
}

impl CharacterViewModel {
    pub fn new(
        id: CharacterId,
        fetch: FetchCharacterData,
        settings: Arc<dyn SettingsManager>,
        navigator: Navigator,
    ) -> Self {
        Self {
            id,
            fetch,
            settings,
            navigator,
        }
    }
}

/// Shared by the detail and profile screens.
pub(super) async fn load_into<VM>(
    fetch: &FetchCharacterData,
    id: CharacterId,
    scope: &ScreenScope<VM>,
    apply: impl Fn(&mut VM::State, Option<Character>, bool) + Send + Sync,
) where
    VM: ViewModel,
{
    scope.update(|s| apply(s, None, true));
    let found = fetch.fetch(id).await;
    scope.update(|s| apply(s, found, false));
}

fn apply_fetch(state: &mut CharacterState, character: Option<Character>, loading: bool) {
    state.is_loading = loading;
    if loading {
        state.is_error = false;
    } else {
        state.is_error = character.is_none();
        state.character = character;
    }
}

#[async_trait]
impl ViewModel for CharacterViewModel {
    type Intent = CharacterIntent;
    type State = CharacterState;
    type Effect = ();

    const NAME: &'static str = "character";

    fn initial_state(&self) -> CharacterState {
        CharacterState {
            id: self.id,
            settings: self.settings.settings(),
            character: None,
            is_loading: true,
            is_error: false,
        }
    }

    async fn on_open(&mut self, scope: &ScreenScope<Self>) {
        scope.collect(
            WatchStream::new(self.settings.subscribe()),
            |state: &mut CharacterState, settings: Settings| state.settings = settings,
        );
        load_into(&self.fetch, self.id, scope, apply_fetch).await;
    }

    async fn handle(&mut self, intent: CharacterIntent, scope: &ScreenScope<Self>) {
        match intent {
            CharacterIntent::FetchData => {
                load_into(&self.fetch, self.id, scope, apply_fetch).await;
            }
            CharacterIntent::Back => {
                self.navigator.send(NavRootIntent::Back);
            }
        }
    }
}

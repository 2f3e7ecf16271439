use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use super::character::load_into;
use super::screen::{ScreenScope, ViewModel};
use crate::domain::{Character, CharacterId, Settings, SettingsManager};
use crate::service::FetchCharacterData;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileState {
    pub settings: Settings,
    pub character: Option<Character>,
    pub is_loading: bool,
    pub is_error: bool,
}

impl ProfileState {
    pub fn character_id(&self) -> Option<CharacterId> {
        self.settings.your_character_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileIntent {
    FetchData,
}

/// The character chosen as "mine" in settings.
pub struct ProfileViewModel {
    fetch: FetchCharacterData,
    settings: Arc<dyn SettingsManager>,
}

impl ProfileViewModel {
    pub fn new(fetch: FetchCharacterData, settings: Arc<dyn SettingsManager>) -> Self {
        Self { fetch, settings }
    }

    async fn load(&self, scope: &ScreenScope<Self>) {
        let Some(id) = scope.state().character_id() else {
            scope.update(|s| {
                s.character = None;
                s.is_loading = false;
                s.is_error = true;
            });
            return;
        };
        load_into(&self.fetch, id, scope, |s: &mut ProfileState, found, loading| {
            s.is_loading = loading;
            if loading {
                s.is_error = false;
            } else {
                s.is_error = found.is_none();
                s.character = found;
            }
        })
        .await;
    }
}

#[async_trait]
impl ViewModel for ProfileViewModel {
    type Intent = ProfileIntent;
    type State = ProfileState;
    type Effect = ();

    const NAME: &'static str = "profile";

    fn initial_state(&self) -> ProfileState {
        ProfileState {
            settings: self.settings.settings(),
            character: None,
            is_loading: true,
            is_error: false,
        }
    }

    async fn on_open(&mut self, scope: &ScreenScope<Self>) {
        // Re-fetch whenever a different character is chosen.
        let cell = scope.state_cell();
        let sender = scope.sender();
        let mut changes = WatchStream::from_changes(self.settings.subscribe());
        scope.spawn(async move {
            while let Some(settings) = changes.next().await {
                let previous = cell.get().character_id();
                cell.update(|s| s.settings = settings);
                if previous != settings.your_character_id {
                    debug!(id = ?settings.your_character_id, "chosen character changed");
                    sender.send(ProfileIntent::FetchData);
                }
            }
        });
        self.load(scope).await;
    }

    async fn handle(&mut self, intent: ProfileIntent, scope: &ScreenScope<Self>) {
        match intent {
            ProfileIntent::FetchData => self.load(scope).await,
        }
    }
}

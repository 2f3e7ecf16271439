use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use super::screen::{IntentSender, ScreenScope, ViewModel};
use crate::domain::{CharacterId, Settings, SettingsManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    /// Nested graph holding the bottom-bar tabs; resolves to `Characters`.
    BottomBarScreens,
    Characters,
    Favourites,
    Settings,
    Profile,
    Character(CharacterId),
}

impl Screen {
    pub fn has_bottom_bar(self) -> bool {
        !matches!(self, Screen::Character(_))
    }

    fn resolve(self) -> Screen {
        match self {
            Screen::BottomBarScreens => Screen::Characters,
            other => other,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::BottomBarScreens | Screen::Characters => f.write_str("Characters"),
            Screen::Favourites => f.write_str("Favourites"),
            Screen::Settings => f.write_str("Settings"),
            Screen::Profile => f.write_str("Profile"),
            Screen::Character(id) => write!(f, "Character #{id}"),
        }
    }
}

/// Tabs shown in the bottom bar. Profile only appears once a character is chosen.
pub fn bottom_bar_screens(settings: &Settings) -> Vec<Screen> {
    let mut screens = vec![Screen::Characters, Screen::Favourites];
    if settings.your_character_id.is_some() {
        screens.push(Screen::Profile);
    }
    screens.push(Screen::Settings);
    screens
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavRootState {
    pub settings: Settings,
    pub start_screen: Screen,
    pub current_screen: Screen,
    pub back_stack: Vec<Screen>,
    pub is_bottom_bar_visible: bool,
    pub is_my_character_chosen: bool,
}

impl NavRootState {
    pub fn bottom_bar_items(&self) -> Vec<Screen> {
        bottom_bar_screens(&self.settings)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavRootIntent {
    NavigateToScreen(Screen),
    NavigateToBottomBarScreen(Screen),
    Back,
    UpdateCurrentScreen(Screen),
    ChangeBottomBarVisible(bool),
    ClearBackStack,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavRootEffect {
    Navigated(Screen),
    Exit,
}

pub type Navigator = IntentSender<NavRootIntent>;

pub struct NavRootViewModel {
    settings_manager: Arc<dyn SettingsManager>,
}

impl NavRootViewModel {
    pub fn new(settings_manager: Arc<dyn SettingsManager>) -> Self {
        Self { settings_manager }
    }
}

fn show(state: &mut NavRootState, screen: Screen) {
    state.current_screen = screen;
    state.is_bottom_bar_visible = screen.has_bottom_bar();
}

#[async_trait]
impl ViewModel for NavRootViewModel {
    type Intent = NavRootIntent;
    type State = NavRootState;
    type Effect = NavRootEffect;

    const NAME: &'static str = "nav_root";

    fn initial_state(&self) -> NavRootState {
        let settings = self.settings_manager.settings();
        let start = Screen::BottomBarScreens.resolve();
        NavRootState {
            settings,
            start_screen: start,
            current_screen: start,
            back_stack: vec![start],
            is_bottom_bar_visible: true,
            is_my_character_chosen: settings.your_character_id.is_some(),
        }
    }

    async fn on_open(&mut self, scope: &ScreenScope<Self>) {
        scope.collect(
            WatchStream::new(self.settings_manager.subscribe()),
            |state: &mut NavRootState, settings: Settings| {
                state.settings = settings;
                state.is_my_character_chosen = settings.your_character_id.is_some();
            },
        );
    }

    async fn handle(&mut self, intent: NavRootIntent, scope: &ScreenScope<Self>) {
        debug!(?intent, "navigation");
        match intent {
            NavRootIntent::NavigateToScreen(screen) => {
                let screen = screen.resolve();
                scope.update(|s| {
                    if s.back_stack.last() != Some(&screen) {
                        s.back_stack.push(screen);
                    }
                    show(s, screen);
                });
                scope.emit(NavRootEffect::Navigated(screen));
            }
            NavRootIntent::NavigateToBottomBarScreen(screen) => {
                let screen = screen.resolve();
                scope.update(|s| {
                    s.back_stack.truncate(1);
                    if s.back_stack.last() != Some(&screen) {
                        s.back_stack.push(screen);
                    }
                    show(s, screen);
                });
                scope.emit(NavRootEffect::Navigated(screen));
            }
            NavRootIntent::Back => {
                let mut exit = false;
                scope.update(|s| {
                    if s.back_stack.len() > 1 {
                        s.back_stack.pop();
                        let top = s.back_stack.last().copied().unwrap_or(s.start_screen);
                        show(s, top);
                    } else {
                        exit = true;
                    }
                });
                if exit {
                    scope.emit(NavRootEffect::Exit);
                } else {
                    scope.emit(NavRootEffect::Navigated(scope.state().current_screen));
                }
            }
            NavRootIntent::UpdateCurrentScreen(screen) => {
                scope.update(|s| show(s, screen.resolve()));
            }
            NavRootIntent::ChangeBottomBarVisible(visible) => {
                scope.update(|s| s.is_bottom_bar_visible = visible);
            }
            NavRootIntent::ClearBackStack => {
                scope.update(|s| {
                    s.back_stack = vec![s.start_screen];
                    let start = s.start_screen;
                    show(s, start);
                });
            }
        }
    }
}

use async_trait::async_trait;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tracing::warn;

use super::screen::{ScreenScope, ViewModel};
use super::theme;
use crate::domain::{CharacterId, Settings, SettingsManager, ThemeColor};

pub const PROJECT_LINK: &str = "https://rickandmortyapi.com";

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsState {
    pub settings: Settings,
    pub is_color_dialog_visible: bool,
    /// Which theme the open dialog edits.
    pub dialog_is_dark: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsIntent {
    /// `None` restores the default accent.
    SetThemeColor { is_dark: bool, color: Option<ThemeColor> },
    SetRandomThemeColor { is_dark: bool },
    SetMyCharacter(Option<CharacterId>),
    OpenColorDialog { is_dark: bool },
    CloseColorDialog,
    OpenLink(String),
    SendEmail(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEffect {
    OpenLink(String),
    /// A `mailto:` URI with the bug-report subject filled in.
    SendEmail(String),
}

pub fn bug_report_uri(email: &str) -> String {
    format!(
        "mailto:{email}?subject=BugReport%20{}",
        env!("CARGO_PKG_NAME")
    )
}

pub struct SettingsViewModel {
    settings: Arc<dyn SettingsManager>,
}

impl SettingsViewModel {
    pub fn new(settings: Arc<dyn SettingsManager>) -> Self {
        Self { settings }
    }

    async fn save(
        &self,
        scope: &ScreenScope<Self>,
        update: impl FnOnce(Settings) -> Settings + Send + 'static,
    ) {
        match self.settings.save(Box::new(update)).await {
            Ok(saved) => scope.update(|s| {
                s.settings = saved;
                s.error = None;
            }),
            Err(e) => {
                warn!(error = %e, "settings save failed");
                scope.update(|s| s.error = Some(e.to_string()));
            }
        }
    }
}

fn with_theme_color(mut settings: Settings, is_dark: bool, color: Option<ThemeColor>) -> Settings {
    if is_dark {
        settings.dark_theme_color = color;
    } else {
        settings.light_theme_color = color;
    }
    settings
}

#[async_trait]
impl ViewModel for SettingsViewModel {
    type Intent = SettingsIntent;
    type State = SettingsState;
    type Effect = SettingsEffect;

    const NAME: &'static str = "settings";

    fn initial_state(&self) -> SettingsState {
        SettingsState {
            settings: self.settings.settings(),
            is_color_dialog_visible: false,
            dialog_is_dark: false,
            error: None,
        }
    }

    async fn on_open(&mut self, scope: &ScreenScope<Self>) {
        scope.collect(
            WatchStream::new(self.settings.subscribe()),
            |state: &mut SettingsState, settings: Settings| state.settings = settings,
        );
    }

    async fn handle(&mut self, intent: SettingsIntent, scope: &ScreenScope<Self>) {
        match intent {
            SettingsIntent::SetThemeColor { is_dark, color } => {
                self.save(scope, move |s| with_theme_color(s, is_dark, color))
                    .await;
                scope.update(|s| s.is_color_dialog_visible = false);
            }
            SettingsIntent::SetRandomThemeColor { is_dark } => {
                let color = theme::random_color();
                self.save(scope, move |s| with_theme_color(s, is_dark, Some(color)))
                    .await;
            }
            SettingsIntent::SetMyCharacter(id) => {
                self.save(scope, move |mut s| {
                    s.your_character_id = id;
                    s
                })
                .await;
            }
            SettingsIntent::OpenColorDialog { is_dark } => scope.update(|s| {
                s.is_color_dialog_visible = true;
                s.dialog_is_dark = is_dark;
            }),
            SettingsIntent::CloseColorDialog => {
                scope.update(|s| s.is_color_dialog_visible = false);
            }
            SettingsIntent::OpenLink(link) => scope.emit(SettingsEffect::OpenLink(link)),
            SettingsIntent::SendEmail(email) => {
                scope.emit(SettingsEffect::SendEmail(bug_report_uri(&email)));
            }
        }
    }
}

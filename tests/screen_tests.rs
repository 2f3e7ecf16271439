mod common;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use rm_catalog::app::AppContainer;
use rm_catalog::config::Config;
use rm_catalog::domain::{CharacterFilters, LifeStatus, Settings, ThemeColor};
use rm_catalog::presentation::{
    CharacterIntent, CharactersIntent, FavouritesIntent, FiltersEffect, FiltersIntent,
    NavRootEffect, NavRootIntent, ProfileIntent, Screen, ScreenHandle, SettingsEffect,
    SettingsIntent, ViewModel,
};
use rm_catalog::service::StaticConnectivity;

async fn app(
    tag: &str,
    remote: Arc<common::FakeRemote>,
    online: bool,
) -> (AppContainer, StaticConnectivity) {
    let connectivity = StaticConnectivity::new(online);
    let config = Config {
        page_size: 5,
        ..Config::default()
    };
    let app = AppContainer::assemble(
        config,
        common::temp_db(tag).await,
        remote,
        Arc::new(connectivity.clone()),
    )
    .await
    .unwrap();
    (app, connectivity)
}

/// Wait until the screen's state satisfies `pred`.
async fn until<VM: ViewModel>(
    handle: &ScreenHandle<VM>,
    pred: impl Fn(&VM::State) -> bool,
) -> VM::State {
    let mut rx = handle.watch();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| pred(s)))
        .await
        .expect("state did not settle")
        .expect("screen closed")
        .clone()
}

#[tokio::test]
async fn navigation_back_stack_rules() {
    let (app, _) = app("nav", common::FakeRemote::new(3, 5), true).await;
    let nav = app.open_nav_root().await.unwrap();
    let mut effects = nav.effects();

    let state = nav.state();
    assert_eq!(state.back_stack, vec![Screen::Characters]);
    assert!(state.is_bottom_bar_visible);

    nav.dispatch(NavRootIntent::NavigateToScreen(Screen::Character(5)));
    let state = nav
        .dispatch_and_wait(NavRootIntent::NavigateToScreen(Screen::Character(5)))
        .await
        .unwrap();
    assert_eq!(
        state.back_stack,
        vec![Screen::Characters, Screen::Character(5)]
    );
    assert_eq!(state.current_screen, Screen::Character(5));
    assert!(!state.is_bottom_bar_visible);

    let state = nav.dispatch_and_wait(NavRootIntent::Back).await.unwrap();
    assert_eq!(state.back_stack, vec![Screen::Characters]);
    assert!(state.is_bottom_bar_visible);

    nav.dispatch(NavRootIntent::NavigateToBottomBarScreen(Screen::Favourites));
    let state = nav
        .dispatch_and_wait(NavRootIntent::NavigateToBottomBarScreen(Screen::Settings))
        .await
        .unwrap();
    assert_eq!(state.back_stack, vec![Screen::Characters, Screen::Settings]);

    let state = nav
        .dispatch_and_wait(NavRootIntent::NavigateToBottomBarScreen(
            Screen::BottomBarScreens,
        ))
        .await
        .unwrap();
    assert_eq!(state.back_stack, vec![Screen::Characters]);
    assert_eq!(state.current_screen, Screen::Characters);

    nav.dispatch_and_wait(NavRootIntent::Back).await.unwrap();
    let mut last = None;
    while let Ok(effect) = effects.try_recv() {
        last = Some(effect);
    }
    assert_eq!(last, Some(NavRootEffect::Exit));
}

#[tokio::test]
async fn navigation_tracks_chosen_character() {
    let (app, _) = app("nav-settings", common::FakeRemote::new(3, 5), true).await;
    let nav = app.open_nav_root().await.unwrap();
    assert!(!nav.state().is_my_character_chosen);
    assert!(!nav.state().bottom_bar_items().contains(&Screen::Profile));

    app.settings
        .save(Box::new(|s: Settings| Settings {
            your_character_id: Some(2),
            ..s
        }))
        .await
        .unwrap();

    let state = until(&nav, |s| s.is_my_character_chosen).await;
    assert!(state.bottom_bar_items().contains(&Screen::Profile));
}

#[tokio::test]
async fn characters_screen_pages_and_toggles() {
    let (app, _) = app("characters", common::FakeRemote::new(12, 5), true).await;
    let nav = app.open_nav_root().await.unwrap();
    let screen = app
        .open_characters(nav.sender(), CharacterFilters::default())
        .await
        .unwrap();
    screen.sync().await.unwrap();

    let state = screen.state();
    assert_eq!(state.characters.len(), 5);
    assert!(!state.end_of_data);
    assert!(!state.is_loading);

    let state = screen
        .dispatch_and_wait(CharactersIntent::LoadMore)
        .await
        .unwrap();
    assert_eq!(state.characters.len(), 10);

    let state = screen
        .dispatch_and_wait(CharactersIntent::LoadMore)
        .await
        .unwrap();
    assert_eq!(state.characters.len(), 12);
    assert!(state.end_of_data);

    screen.dispatch(CharactersIntent::ChangeIsFavourite(3));
    until(&screen, |s| s.favourites == vec![3]).await;
    assert_eq!(app.favourites.favourites().await.unwrap(), vec![3]);
    screen.dispatch(CharactersIntent::ChangeIsFavourite(3));
    until(&screen, |s| s.favourites.is_empty()).await;

    screen.dispatch(CharactersIntent::SetIsMyCharacter(2));
    until(&screen, |s| s.is_my_character(2)).await;
    assert_eq!(app.settings.settings().your_character_id, Some(2));
    screen.dispatch(CharactersIntent::SetIsMyCharacter(2));
    until(&screen, |s| s.settings.your_character_id.is_none()).await;

    screen
        .dispatch_and_wait(CharactersIntent::ClickToCharacter(4))
        .await
        .unwrap();
    nav.sync().await.unwrap();
    assert_eq!(nav.state().current_screen, Screen::Character(4));
}

#[tokio::test]
async fn characters_screen_flags_remote_failures_as_retryable() {
    let remote = common::FakeRemote::new(12, 5);
    remote.set_failing(true);
    let (app, _) = app("characters-failing", remote.clone(), true).await;
    let nav = app.open_nav_root().await.unwrap();
    let screen = app
        .open_characters(nav.sender(), CharacterFilters::default())
        .await
        .unwrap();
    screen.sync().await.unwrap();

    let state = screen.state();
    assert!(state.error.as_deref().is_some_and(|e| e.contains("500")));
    assert!(state.can_retry);
    assert!(!state.is_loading);

    remote.set_failing(false);
    let state = screen
        .dispatch_and_wait(CharactersIntent::Refresh)
        .await
        .unwrap();
    assert_eq!(state.error, None);
    assert!(!state.can_retry);
    assert_eq!(state.characters.len(), 5);
}

#[tokio::test]
async fn applying_filters_hides_sheet_and_reloads() {
    let (app, _) = app("characters-filters", common::FakeRemote::new(12, 5), true).await;
    let nav = app.open_nav_root().await.unwrap();
    let screen = app
        .open_characters(nav.sender(), CharacterFilters::default())
        .await
        .unwrap();

    screen
        .dispatch_and_wait(CharactersIntent::ChangeFilterVisibility(true))
        .await
        .unwrap();
    let state = screen
        .dispatch_and_wait(CharactersIntent::ApplyFilters(
            CharacterFilters::default().with_name("Character 1"),
        ))
        .await
        .unwrap();

    assert!(!state.is_filter_sheet_visible);
    assert_eq!(state.filters.name.as_deref(), Some("Character 1"));
    assert_eq!(
        state.characters.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![1, 10, 11, 12]
    );
    assert!(state.end_of_data);
}

#[tokio::test]
async fn filter_sheet_edits_and_applies() {
    let (app, _) = app("filters", common::FakeRemote::new(1, 5), true).await;
    let sheet = app
        .open_filters(CharacterFilters::default())
        .await
        .unwrap();
    let mut effects = sheet.effects();

    sheet.dispatch(FiltersIntent::NameChanged("rick".into()));
    sheet.dispatch(FiltersIntent::SpeciesChanged("   ".into()));
    sheet.dispatch(FiltersIntent::StatusChanged(Some(LifeStatus::Dead)));
    let state = sheet
        .dispatch_and_wait(FiltersIntent::ApplyFilters)
        .await
        .unwrap();
    assert_eq!(state.filters.species, None);

    let FiltersEffect::Apply(applied) = effects.recv().await.unwrap();
    assert_eq!(
        applied,
        CharacterFilters::default()
            .with_name("rick")
            .with_status(Some(LifeStatus::Dead))
    );

    let state = sheet
        .dispatch_and_wait(FiltersIntent::ResetFilters)
        .await
        .unwrap();
    assert!(state.filters.is_empty());
    let FiltersEffect::Apply(applied) = effects.recv().await.unwrap();
    assert!(applied.is_empty());
}

#[tokio::test]
async fn detail_fetch_online_caches_and_offline_reads_cache() {
    let remote = common::FakeRemote::new(5, 5);
    let (app, connectivity) = app("detail", remote.clone(), true).await;
    let nav = app.open_nav_root().await.unwrap();

    let screen = app.open_character(3, nav.sender()).await.unwrap();
    let state = until(&screen, |s| !s.is_loading).await;
    assert!(!state.is_error);
    assert_eq!(state.character.as_ref().map(|c| c.id), Some(3));
    assert!(app.local.get_character(3).await.unwrap().is_some());

    connectivity.set_online(false);
    let cached = app.open_character(3, nav.sender()).await.unwrap();
    let state = until(&cached, |s| !s.is_loading).await;
    assert_eq!(state.character.as_ref().map(|c| c.id), Some(3));

    let missing = app.open_character(4, nav.sender()).await.unwrap();
    let state = until(&missing, |s| !s.is_loading).await;
    assert!(state.is_error);
    assert!(state.character.is_none());
}

#[tokio::test]
async fn detail_retry_after_remote_failure() {
    let remote = common::FakeRemote::new(5, 5);
    remote.set_failing(true);
    let (app, _) = app("detail-retry", remote.clone(), true).await;
    let nav = app.open_nav_root().await.unwrap();

    let screen = app.open_character(2, nav.sender()).await.unwrap();
    let state = until(&screen, |s| !s.is_loading).await;
    assert!(state.is_error);

    remote.set_failing(false);
    let state = screen
        .dispatch_and_wait(CharacterIntent::FetchData)
        .await
        .unwrap();
    assert!(!state.is_error);
    assert_eq!(state.character.map(|c| c.name), Some("Character 2".to_string()));

    screen
        .dispatch_and_wait(CharacterIntent::Back)
        .await
        .unwrap();
    nav.sync().await.unwrap();
    assert_eq!(nav.state().current_screen, Screen::Characters);
}

#[tokio::test]
async fn profile_follows_chosen_character() {
    let (app, _) = app("profile", common::FakeRemote::new(5, 5), true).await;
    let profile = app.open_profile().await.unwrap();
    let state = until(&profile, |s| !s.is_loading).await;
    assert!(state.is_error);
    assert_eq!(state.character_id(), None);

    app.settings
        .save(Box::new(|s: Settings| Settings {
            your_character_id: Some(4),
            ..s
        }))
        .await
        .unwrap();
    let state = until(&profile, |s| {
        s.character.as_ref().map(|c| c.id) == Some(4) && !s.is_loading
    })
    .await;
    assert!(!state.is_error);

    let state = profile
        .dispatch_and_wait(ProfileIntent::FetchData)
        .await
        .unwrap();
    assert_eq!(state.character.map(|c| c.id), Some(4));
}

#[tokio::test]
async fn settings_screen_saves_colors_and_emits_links() {
    let (app, _) = app("settings", common::FakeRemote::new(1, 5), true).await;
    let screen = app.open_settings().await.unwrap();
    let mut effects = screen.effects();

    screen.dispatch(SettingsIntent::OpenColorDialog { is_dark: true });
    let state = screen
        .dispatch_and_wait(SettingsIntent::SetThemeColor {
            is_dark: true,
            color: Some(ThemeColor::rgb(0x12, 0x34, 0x56)),
        })
        .await
        .unwrap();
    assert!(!state.is_color_dialog_visible);
    assert_eq!(
        state.settings.dark_theme_color,
        Some(ThemeColor::rgb(0x12, 0x34, 0x56))
    );
    assert_eq!(state.settings.light_theme_color, None);
    assert_eq!(app.settings.settings(), state.settings);

    let state = screen
        .dispatch_and_wait(SettingsIntent::SetRandomThemeColor { is_dark: false })
        .await
        .unwrap();
    assert!(state.settings.light_theme_color.is_some());

    screen.dispatch(SettingsIntent::OpenLink("https://rickandmortyapi.com".into()));
    screen.dispatch(SettingsIntent::SendEmail("dev@example.com".into()));
    assert_eq!(
        effects.recv().await.unwrap(),
        SettingsEffect::OpenLink("https://rickandmortyapi.com".into())
    );
    match effects.recv().await.unwrap() {
        SettingsEffect::SendEmail(uri) => {
            assert!(uri.starts_with("mailto:dev@example.com?subject=BugReport"));
        }
        other => panic!("unexpected effect {other:?}"),
    }
}

#[tokio::test]
async fn favourites_screen_lists_and_removes() {
    let (app, _) = app("favourites", common::FakeRemote::new(5, 5), true).await;
    app.local
        .upsert(&[
            common::character(1, "Rick Sanchez"),
            common::character(2, "Morty Smith"),
        ])
        .await
        .unwrap();
    let nav = app.open_nav_root().await.unwrap();
    let screen = app.open_favourites(nav.sender()).await.unwrap();
    let state = until(&screen, |s| !s.is_loading).await;
    assert!(state.characters.is_empty());

    app.favourites.add_to_favourites(1).await.unwrap();
    app.favourites.add_to_favourites(2).await.unwrap();
    until(&screen, |s| s.characters.len() == 2).await;

    screen
        .dispatch_and_wait(FavouritesIntent::RemoveFromFavourites(1))
        .await
        .unwrap();
    let state = until(&screen, |s| s.characters.len() == 1).await;
    assert_eq!(state.characters[0].name, "Morty Smith");
    assert_eq!(app.favourites.favourites().await.unwrap(), vec![2]);

    // Marked before its row is cached; it appears once the row arrives.
    app.favourites.add_to_favourites(4).await.unwrap();
    app.local
        .upsert(&[common::character(4, "Summer Smith")])
        .await
        .unwrap();
    let state = until(&screen, |s| s.characters.len() == 2).await;
    assert_eq!(
        state.characters.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![2, 4]
    );

    screen
        .dispatch_and_wait(FavouritesIntent::ClickToCharacter(2))
        .await
        .unwrap();
    nav.sync().await.unwrap();
    assert_eq!(nav.state().current_screen, Screen::Character(2));
}

#[tokio::test]
async fn closed_screen_rejects_intents() {
    let (app, _) = app("close", common::FakeRemote::new(1, 5), true).await;
    let nav = app.open_nav_root().await.unwrap();
    let sender = nav.sender();
    assert!(sender.send(NavRootIntent::ClearBackStack));

    nav.close().await;
    assert!(!sender.send(NavRootIntent::ClearBackStack));
}

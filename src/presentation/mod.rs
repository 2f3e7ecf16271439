//! Screens as actor-backed state containers, plus the navigation root that
//! ties them together and helpers to render their state as text.

pub mod character;
pub mod characters;
pub mod favourites;
pub mod filters;
pub mod navigation;
pub mod profile;
pub mod render;
pub mod screen;
pub mod settings;
pub mod theme;

pub use character::{CharacterIntent, CharacterState, CharacterViewModel};
pub use characters::{CharactersEffect, CharactersIntent, CharactersState, CharactersViewModel};
pub use favourites::{FavouritesIntent, FavouritesState, FavouritesViewModel};
pub use filters::{FiltersEffect, FiltersIntent, FiltersState, FiltersViewModel};
pub use navigation::{
    NavRootEffect, NavRootIntent, NavRootState, NavRootViewModel, Navigator, Screen,
    bottom_bar_screens,
};
pub use profile::{ProfileIntent, ProfileState, ProfileViewModel};
pub use screen::{IntentSender, ScreenHandle, ScreenScope, StateCell, ViewModel};
pub use settings::{SettingsEffect, SettingsIntent, SettingsState, SettingsViewModel};

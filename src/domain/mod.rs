//! Value types and the contracts between layers.

pub mod filters;
pub mod model;
pub mod ports;

pub use filters::CharacterFilters;
pub use model::{
    Character, CharacterId, Gender, LifeStatus, Location, PaginationInfo, Settings, ThemeColor,
};
pub use ports::{
    CharacterLocalRepository, CharacterPage, CharacterRemoteRepository, ConnectivityChecker,
    FavouritesRepository, SettingsManager, SettingsUpdate,
};

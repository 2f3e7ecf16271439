pub mod connectivity;
pub mod fetch_character;
pub mod paging;
pub mod remote_repository;
pub mod settings_manager;

pub use connectivity::{HttpConnectivityChecker, StaticConnectivity};
pub use fetch_character::FetchCharacterData;
pub use paging::{CharacterPager, CharactersRemoteMediator, LoadType, MediatorResult, PageLoad};
pub use remote_repository::ApiCharacterRepository;
pub use settings_manager::{KvSettingsManager, SETTINGS_KEY};

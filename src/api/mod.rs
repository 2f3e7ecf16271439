pub mod character_api;

pub use character_api::CharacterApi;

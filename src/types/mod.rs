//! Wire-format records mirroring the remote API's JSON.

pub mod character;

pub use character::{
    CharacterDto, CharacterResponse, GenderDto, LifeStatusDto, LocationDto, PageInfo,
};

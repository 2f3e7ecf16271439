use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

use crate::domain::{Character, CharacterId, Gender, LifeStatus, Location};

/// Row of the `characters` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct CharacterEntity {
    pub id: i64,
    pub name: String,
    pub life_status: String,
    pub species: String,
    pub subtype: Option<String>,
    pub gender: String,
    pub origin_name: String,
    pub origin_id: Option<i64>,
    pub current_location_name: String,
    pub current_location_id: Option<i64>,
    pub image_url: String,
    pub episode_ids: String,
    pub api_url: String,
    pub created_at: String,
    pub next_key: Option<i64>,
}

/// Row of the `favourites` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct FavouriteEntity {
    pub id: i64,
}

fn to_u32(v: i64) -> Option<u32> {
    u32::try_from(v).ok()
}

impl From<&Character> for CharacterEntity {
    fn from(c: &Character) -> Self {
        Self {
            id: i64::from(c.id),
            name: c.name.clone(),
            life_status: c.life_status.as_str().to_string(),
            species: c.species.clone(),
            subtype: c.subtype.clone(),
            gender: c.gender.as_str().to_string(),
            origin_name: c.origin.name.clone(),
            origin_id: c.origin.location_id.map(i64::from),
            current_location_name: c.current_location.name.clone(),
            current_location_id: c.current_location.location_id.map(i64::from),
            image_url: c.image_url.clone(),
            episode_ids: serde_json::to_string(&c.episode_ids).unwrap_or_else(|_| "[]".to_string()),
            api_url: c.api_url.clone(),
            created_at: c.created_at.to_rfc3339(),
            next_key: c.next_key.map(i64::from),
        }
    }
}

impl From<CharacterEntity> for Character {
    fn from(e: CharacterEntity) -> Self {
        let episode_ids = serde_json::from_str::<Vec<u32>>(&e.episode_ids).unwrap_or_else(|err| {
            warn!(id = e.id, error = %err, "malformed episode_ids; using empty list");
            Vec::new()
        });
        let created_at = DateTime::parse_from_rfc3339(&e.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|err| {
                warn!(id = e.id, error = %err, "malformed created_at; using epoch");
                DateTime::<Utc>::UNIX_EPOCH
            });
        Character {
            id: to_u32(e.id).unwrap_or_default(),
            name: e.name,
            life_status: LifeStatus::from_stored(&e.life_status),
            species: e.species,
            subtype: e.subtype.filter(|s| !s.is_empty()),
            gender: Gender::from_stored(&e.gender),
            origin: Location {
                name: e.origin_name,
                location_id: e.origin_id.and_then(to_u32),
            },
            current_location: Location {
                name: e.current_location_name,
                location_id: e.current_location_id.and_then(to_u32),
            },
            image_url: e.image_url,
            episode_ids,
            api_url: e.api_url,
            created_at,
            next_key: e.next_key.and_then(to_u32),
        }
    }
}

impl From<FavouriteEntity> for CharacterId {
    fn from(f: FavouriteEntity) -> Self {
        to_u32(f.id).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Character {
        Character {
            id: 2,
            name: "Morty Smith".into(),
            life_status: LifeStatus::Alive,
            species: "Human".into(),
            subtype: Some("Clone".into()),
            gender: Gender::Male,
            origin: Location {
                name: "unknown".into(),
                location_id: None,
            },
            current_location: Location {
                name: "Citadel of Ricks".into(),
                location_id: Some(3),
            },
            image_url: "https://rickandmortyapi.com/api/character/avatar/2.jpeg".into(),
            episode_ids: vec![1, 2, 3],
            api_url: "https://rickandmortyapi.com/api/character/2".into(),
            created_at: DateTime::parse_from_rfc3339("2017-11-04T18:50:21.651Z")
                .unwrap()
                .with_timezone(&Utc),
            next_key: Some(2),
        }
    }

    #[test]
    fn entity_round_trip_preserves_fields() {
        let original = sample();
        let entity = CharacterEntity::from(&original);
        assert_eq!(entity.episode_ids, "[1,2,3]");
        assert_eq!(entity.life_status, "Alive");
        assert_eq!(Character::from(entity), original);
    }

    #[test]
    fn malformed_columns_fall_back() {
        let mut entity = CharacterEntity::from(&sample());
        entity.episode_ids = "not json".into();
        entity.created_at = "31/12/2020".into();
        entity.life_status = "???".into();
        let c = Character::from(entity);
        assert!(c.episode_ids.is_empty());
        assert_eq!(c.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(c.life_status, LifeStatus::Unknown);
    }
}

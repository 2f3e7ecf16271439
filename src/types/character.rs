use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Character, Gender, LifeStatus, Location, PaginationInfo};

/// Body of `GET /character/`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CharacterResponse {
    pub info: PageInfo,
    #[serde(default)]
    pub results: Option<Vec<CharacterDto>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageInfo {
    pub count: u32,
    pub pages: u32,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// One character as the API spells it. Also the body of `GET /character/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CharacterDto {
    pub id: u32,
    pub name: String,
    pub status: LifeStatusDto,
    pub species: String,
    #[serde(rename = "type", default)]
    pub subtype: String,
    pub gender: GenderDto,
    pub origin: LocationDto,
    pub location: LocationDto,
    pub image: String,
    #[serde(default)]
    pub episode: Vec<String>,
    pub url: String,
    pub created: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum LifeStatusDto {
    Alive,
    Dead,
    #[serde(rename = "unknown", alias = "Unknown")]
    Unknown,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum GenderDto {
    Male,
    Female,
    Genderless,
    #[serde(rename = "unknown", alias = "Unknown")]
    Unknown,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationDto {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl From<LifeStatusDto> for LifeStatus {
    fn from(s: LifeStatusDto) -> Self {
        match s {
            LifeStatusDto::Alive => LifeStatus::Alive,
            LifeStatusDto::Dead => LifeStatus::Dead,
            LifeStatusDto::Unknown => LifeStatus::Unknown,
        }
    }
}

impl From<GenderDto> for Gender {
    fn from(g: GenderDto) -> Self {
        match g {
            GenderDto::Male => Gender::Male,
            GenderDto::Female => Gender::Female,
            GenderDto::Genderless => Gender::Genderless,
            GenderDto::Unknown => Gender::Unknown,
        }
    }
}

impl From<LocationDto> for Location {
    fn from(l: LocationDto) -> Self {
        Location {
            location_id: extract_id(&l.url),
            name: l.name,
        }
    }
}

impl PageInfo {
    pub fn to_domain(&self) -> PaginationInfo {
        PaginationInfo {
            total_count: self.count,
            total_pages: self.pages,
            next_page: self.next.as_deref().and_then(extract_page_number),
            prev_page: self.prev.as_deref().and_then(extract_page_number),
        }
    }
}

impl CharacterResponse {
    pub fn into_domain(self) -> (PaginationInfo, Vec<Character>) {
        let pagination = self.info.to_domain();
        let characters = self
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|dto| dto.into_domain(pagination.next_page))
            .collect();
        (pagination, characters)
    }
}

impl CharacterDto {
    pub fn into_domain(self, next_key: Option<u32>) -> Character {
        let created_at = parse_created(&self.created).unwrap_or_else(|| {
            warn!(id = self.id, created = %self.created, "unparseable creation timestamp");
            DateTime::<Utc>::UNIX_EPOCH
        });
        Character {
            id: self.id,
            name: self.name,
            life_status: self.status.into(),
            species: self.species,
            subtype: (!self.subtype.is_empty()).then_some(self.subtype),
            gender: self.gender.into(),
            origin: self.origin.into(),
            current_location: self.location.into(),
            image_url: self.image,
            episode_ids: self.episode.iter().filter_map(|e| extract_id(e)).collect(),
            api_url: self.url,
            created_at,
            next_key,
        }
    }
}

fn parse_created(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Trailing numeric path segment of a resource URL, e.g. `.../location/3` -> 3.
pub fn extract_id(url: &str) -> Option<u32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

/// Value of the `page=` query parameter of a pagination URL.
pub fn extract_page_number(url: &str) -> Option<u32> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok())
}

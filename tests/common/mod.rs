#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rm_catalog::db::{self, Database};
use rm_catalog::domain::{
    Character, CharacterFilters, CharacterId, CharacterPage, CharacterRemoteRepository, Gender,
    LifeStatus, Location, PaginationInfo,
};
use rm_catalog::error::CatalogError;

/// Fresh SQLite file under the temp dir, unique per call.
pub async fn temp_db(tag: &str) -> Database {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "rm-catalog-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    db::connect(&format!("sqlite:{}", path.display()))
        .await
        .expect("open temp database")
}

pub fn character(id: CharacterId, name: &str) -> Character {
    Character {
        id,
        name: name.to_string(),
        life_status: LifeStatus::Alive,
        species: "Human".to_string(),
        subtype: None,
        gender: Gender::Male,
        origin: Location {
            name: "Earth (C-137)".to_string(),
            location_id: Some(1),
        },
        current_location: Location {
            name: "Citadel of Ricks".to_string(),
            location_id: Some(3),
        },
        image_url: format!("https://rickandmortyapi.com/api/character/avatar/{id}.jpeg"),
        episode_ids: vec![1, 2],
        api_url: format!("https://rickandmortyapi.com/api/character/{id}"),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        next_key: None,
    }
}

/// In-memory stand-in for the REST API: a fixed roster served in pages.
pub struct FakeRemote {
    roster: Vec<Character>,
    page_size: usize,
    fail: Mutex<bool>,
    calls: AtomicUsize,
    pages: Mutex<Vec<u32>>,
}

impl FakeRemote {
    pub fn new(count: u32, page_size: usize) -> Arc<Self> {
        let roster = (1..=count)
            .map(|id| character(id, &format!("Character {id}")))
            .collect();
        Arc::new(Self {
            roster,
            page_size,
            fail: Mutex::new(false),
            calls: AtomicUsize::new(0),
            pages: Mutex::new(Vec::new()),
        })
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.pages.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail.lock().unwrap() {
            Err(CatalogError::UpstreamStatus(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CharacterRemoteRepository for FakeRemote {
    async fn get_characters(
        &self,
        filters: &CharacterFilters,
        page: u32,
    ) -> Result<CharacterPage, CatalogError> {
        self.check()?;
        self.pages.lock().unwrap().push(page);
        let name = filters.clone().normalized().name.map(|n| n.to_lowercase());
        let matching: Vec<Character> = self
            .roster
            .iter()
            .filter(|c| {
                name.as_ref()
                    .is_none_or(|n| c.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        let start = (page.max(1) as usize - 1) * self.page_size;
        let items: Vec<Character> = matching
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        let total_pages = matching.len().div_ceil(self.page_size) as u32;
        let info = PaginationInfo {
            total_count: matching.len() as u32,
            total_pages,
            next_page: (page < total_pages).then_some(page + 1),
            prev_page: (page > 1).then(|| page - 1),
        };
        Ok((info, items))
    }

    async fn get_character(&self, id: CharacterId) -> Result<Character, CatalogError> {
        self.check()?;
        self.roster
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(CatalogError::CharacterNotFound(id))
    }
}

/// JSON body of one character as the API returns it.
pub fn character_json(id: u32, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "status": "Alive",
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": { "name": "Earth (C-137)", "url": "https://rickandmortyapi.com/api/location/1" },
        "location": { "name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3" },
        "image": format!("https://rickandmortyapi.com/api/character/avatar/{id}.jpeg"),
        "episode": [
            "https://rickandmortyapi.com/api/episode/1",
            "https://rickandmortyapi.com/api/episode/2"
        ],
        "url": format!("https://rickandmortyapi.com/api/character/{id}"),
        "created": "2017-11-04T18:48:46.250Z"
    })
}

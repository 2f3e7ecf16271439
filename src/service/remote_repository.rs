use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::api::CharacterApi;
use crate::domain::{
    Character, CharacterFilters, CharacterId, CharacterPage, CharacterRemoteRepository,
    PaginationInfo,
};
use crate::error::CatalogError;

/// [`CharacterRemoteRepository`] over the REST API.
#[derive(Clone)]
pub struct ApiCharacterRepository {
    api: CharacterApi,
}

impl ApiCharacterRepository {
    pub fn new(api: CharacterApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CharacterRemoteRepository for ApiCharacterRepository {
    async fn get_characters(
        &self,
        filters: &CharacterFilters,
        page: u32,
    ) -> Result<CharacterPage, CatalogError> {
        match self.api.filter_characters(filters, page).await {
            Ok(resp) => {
                let (info, characters) = resp.into_domain();
                debug!(page, returned = characters.len(), total = info.total_count, "page fetched");
                Ok((info, characters))
            }
            // The API answers 404 when nothing matches the filters.
            Err(CatalogError::UpstreamStatus(StatusCode::NOT_FOUND)) => {
                debug!(page, ?filters, "no characters match; returning empty page");
                Ok((PaginationInfo::empty(), Vec::new()))
            }
            Err(e) => {
                warn!(page, error = %e, "character page request failed");
                Err(e)
            }
        }
    }

    async fn get_character(&self, id: CharacterId) -> Result<Character, CatalogError> {
        match self.api.get_character(id).await {
            Ok(dto) => Ok(dto.into_domain(None)),
            Err(CatalogError::UpstreamStatus(StatusCode::NOT_FOUND)) => {
                Err(CatalogError::CharacterNotFound(id))
            }
            Err(e) => {
                warn!(id, error = %e, "character request failed");
                Err(e)
            }
        }
    }
}

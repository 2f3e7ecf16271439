use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{
    Character, CharacterId, CharacterLocalRepository, CharacterRemoteRepository,
    ConnectivityChecker,
};

/// Detail lookup: network first (refreshing the cached row), cache when offline.
#[derive(Clone)]
pub struct FetchCharacterData {
    remote: Arc<dyn CharacterRemoteRepository>,
    local: Arc<dyn CharacterLocalRepository>,
    connectivity: Arc<dyn ConnectivityChecker>,
}

impl FetchCharacterData {
    pub fn new(
        remote: Arc<dyn CharacterRemoteRepository>,
        local: Arc<dyn CharacterLocalRepository>,
        connectivity: Arc<dyn ConnectivityChecker>,
    ) -> Self {
        Self {
            remote,
            local,
            connectivity,
        }
    }

    /// `None` when the character could not be obtained; the caller shows a retry.
    pub async fn fetch(&self, id: CharacterId) -> Option<Character> {
        if self.connectivity.is_internet_available().await {
            match self.remote.get_character(id).await {
                Ok(character) => {
                    if let Err(e) = self.local.upsert(std::slice::from_ref(&character)).await {
                        warn!(id, error = %e, "failed to cache fetched character");
                    }
                    Some(character)
                }
                Err(e) => {
                    warn!(id, error = %e, "character fetch failed");
                    None
                }
            }
        } else {
            debug!(id, "offline; reading character from cache");
            match self.local.get_character(id).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(id, error = %e, "cache lookup failed");
                    None
                }
            }
        }
    }
}

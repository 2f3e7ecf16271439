//! Paging over the character cache, with a mediator that tops the cache up
//! from the network while it is reachable.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    Character, CharacterFilters, CharacterId, CharacterLocalRepository,
    CharacterRemoteRepository, ConnectivityChecker,
};
use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadType {
    Refresh,
    Prepend,
    Append,
}

#[derive(Debug)]
pub enum MediatorResult {
    Success { end_of_pagination_reached: bool },
    Error(CatalogError),
}

impl MediatorResult {
    fn end() -> Self {
        MediatorResult::Success {
            end_of_pagination_reached: true,
        }
    }
}

/// Decides, per load, whether to fetch a remote page into the cache or to
/// leave the cache as the only source.
pub struct CharactersRemoteMediator {
    local: Arc<dyn CharacterLocalRepository>,
    remote: Arc<dyn CharacterRemoteRepository>,
    connectivity: Arc<dyn ConnectivityChecker>,
    filters: CharacterFilters,
    /// Last remote page written to the cache; 0 before the first load.
    page_index: u32,
    /// Highest id delivered by the remote since the last refresh.
    fetched_up_to: Option<CharacterId>,
    end_reached: bool,
}

impl CharactersRemoteMediator {
    pub fn new(
        local: Arc<dyn CharacterLocalRepository>,
        remote: Arc<dyn CharacterRemoteRepository>,
        connectivity: Arc<dyn ConnectivityChecker>,
        filters: CharacterFilters,
    ) -> Self {
        Self {
            local,
            remote,
            connectivity,
            filters: filters.normalized(),
            page_index: 0,
            fetched_up_to: None,
            end_reached: false,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn end_reached(&self) -> bool {
        self.end_reached
    }

    pub fn fetched_up_to(&self) -> Option<CharacterId> {
        self.fetched_up_to
    }

    pub async fn load(&mut self, load_type: LoadType) -> MediatorResult {
        let page = match load_type {
            LoadType::Prepend => return MediatorResult::end(),
            LoadType::Refresh => {
                self.page_index = 0;
                self.fetched_up_to = None;
                self.end_reached = false;
                1
            }
            LoadType::Append if self.end_reached => return MediatorResult::end(),
            LoadType::Append => self.page_index + 1,
        };

        if !self.connectivity.is_internet_available().await {
            info!(page, "network unreachable; serving cached characters only");
            return MediatorResult::end();
        }

        let (info, characters) = match self.remote.get_characters(&self.filters, page).await {
            Ok(result) => result,
            Err(e) => {
                warn!(page, error = %e, "remote page load failed");
                return MediatorResult::Error(e);
            }
        };

        if load_type == LoadType::Refresh {
            match self.local.clear_except_favourites().await {
                Ok(removed) => debug!(removed, "cache cleared for refresh"),
                Err(e) => return MediatorResult::Error(e),
            }
        }
        if let Err(e) = self.local.upsert(&characters).await {
            return MediatorResult::Error(e);
        }

        self.page_index = page;
        self.fetched_up_to = characters
            .iter()
            .map(|c| c.id)
            .max()
            .max(self.fetched_up_to);
        // The API links the next page until the last one.
        self.end_reached = characters.is_empty() || info.next_page.is_none();
        debug!(
            page,
            returned = characters.len(),
            end = self.end_reached,
            "remote page cached"
        );
        MediatorResult::Success {
            end_of_pagination_reached: self.end_reached,
        }
    }
}

/// One step of the pager.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLoad {
    pub items: Vec<Character>,
    pub end_of_data: bool,
}

/// Reads the cache page by page with fixed filters, asking the mediator for
/// more remote data whenever the cache runs out.
///
/// Pages are keyed by the last id returned. While the remote still has pages,
/// reads stop at the highest id it has delivered, so rows kept from earlier
/// sessions (favourites) only show up once the remote walk reaches them.
pub struct CharacterPager {
    mediator: CharactersRemoteMediator,
    local: Arc<dyn CharacterLocalRepository>,
    filters: CharacterFilters,
    page_size: u64,
    last_id: CharacterId,
    remote_exhausted: bool,
    end_reached: bool,
}

impl CharacterPager {
    pub fn new(
        local: Arc<dyn CharacterLocalRepository>,
        remote: Arc<dyn CharacterRemoteRepository>,
        connectivity: Arc<dyn ConnectivityChecker>,
        filters: CharacterFilters,
        page_size: u32,
    ) -> Self {
        let filters = filters.normalized();
        let mediator =
            CharactersRemoteMediator::new(local.clone(), remote, connectivity, filters.clone());
        Self {
            mediator,
            local,
            filters,
            page_size: u64::from(page_size.max(1)),
            last_id: 0,
            remote_exhausted: false,
            end_reached: false,
        }
    }

    pub fn end_reached(&self) -> bool {
        self.end_reached
    }

    /// Restart from the first page, re-fetching it remotely when possible.
    pub async fn refresh(&mut self) -> Result<PageLoad, CatalogError> {
        self.last_id = 0;
        self.remote_exhausted = false;
        self.end_reached = false;
        self.fetch(LoadType::Refresh).await?;
        self.read_next().await
    }

    /// The next page after everything returned so far.
    pub async fn load_next(&mut self) -> Result<PageLoad, CatalogError> {
        if self.end_reached {
            return Ok(PageLoad {
                items: Vec::new(),
                end_of_data: true,
            });
        }
        self.read_next().await
    }

    async fn fetch(&mut self, load_type: LoadType) -> Result<(), CatalogError> {
        match self.mediator.load(load_type).await {
            MediatorResult::Success {
                end_of_pagination_reached,
            } => {
                self.remote_exhausted = end_of_pagination_reached;
                Ok(())
            }
            MediatorResult::Error(e) => Err(e),
        }
    }

    /// Fill one page from the cache, pulling remote pages until it is full
    /// or the remote has nothing left.
    async fn read_next(&mut self) -> Result<PageLoad, CatalogError> {
        loop {
            let up_to = if self.remote_exhausted {
                None
            } else {
                self.mediator.fetched_up_to()
            };
            let items = if self.remote_exhausted || up_to.is_some() {
                self.local
                    .get_page(&self.filters, self.last_id, up_to, self.page_size)
                    .await?
            } else {
                Vec::new()
            };

            if self.remote_exhausted || items.len() as u64 >= self.page_size {
                if let Some(last) = items.last() {
                    self.last_id = last.id;
                }
                self.end_reached = self.remote_exhausted && (items.len() as u64) < self.page_size;
                return Ok(PageLoad {
                    items,
                    end_of_data: self.end_reached,
                });
            }
            self.fetch(LoadType::Append).await?;
        }
    }
}

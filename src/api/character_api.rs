use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::config::{Config, USER_AGENT};
use crate::domain::{CharacterFilters, CharacterId};
use crate::error::CatalogError;
use crate::types::{CharacterDto, CharacterResponse};

/// Thin HTTP binding for the character endpoints. Returns wire DTOs; mapping
/// to domain types and the 404 policy live in the repository.
#[derive(Clone)]
pub struct CharacterApi {
    client: reqwest::Client,
    base_url: Url,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl CharacterApi {
    pub fn new(cfg: &Config) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout());
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        let client = builder.build()?;

        Ok(Self::with_client(client, cfg.api_base_url.clone(), cfg.requests_per_minute))
    }

    pub fn with_client(client: reqwest::Client, base_url: Url, requests_per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));
        Self {
            client,
            base_url,
            limiter,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET character/?name&status&species&type&gender&page`
    pub async fn filter_characters(
        &self,
        filters: &CharacterFilters,
        page: u32,
    ) -> Result<CharacterResponse, CatalogError> {
        let mut url = self.base_url.join("character/")?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in filters.query_pairs() {
                query.append_pair(key, &value);
            }
            query.append_pair("page", &page.max(1).to_string());
        }
        self.get_json(url).await
    }

    /// `GET character/{id}`
    pub async fn get_character(&self, id: CharacterId) -> Result<CharacterDto, CatalogError> {
        let url = self.base_url.join(&format!("character/{id}"))?;
        self.get_json(url).await
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, CatalogError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.limiter.until_ready().await;
        debug!(url = %url, "GET");

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            debug!(status = %status, "upstream returned non-success status");
            return Err(CatalogError::UpstreamStatus(status));
        }
        Ok(resp.json::<T>().await?)
    }
}

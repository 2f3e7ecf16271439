use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::CatalogError;

pub const DEFAULT_API_BASE_URL: &str = "https://rickandmortyapi.com/api/";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:rm-catalog.sqlite";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const USER_AGENT: &str = concat!("rm-catalog/", env!("CARGO_PKG_VERSION"));

const CONFIG_FILE_ENV: &str = "RMC_CONFIG";
const CONFIG_FILE_DEFAULT: &str = "config.toml";
const ENV_PREFIX: &str = "RMC_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Url,
    pub database_url: String,
    /// Rows per page read from the cache. Remote pages keep the API's own size.
    pub page_size: u32,
    pub proxy: Option<Url>,
    pub loglevel: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub requests_per_minute: u32,
    pub connectivity_probe_timeout_ms: u64,
    /// Never touch the network; every read is served from the cache.
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default API URL is valid"),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            proxy: None,
            loglevel: "warn".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 15,
            requests_per_minute: 60,
            connectivity_probe_timeout_ms: 1500,
            offline: false,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (`RMC_CONFIG` or `./config.toml`), then `RMC_*` env vars.
    pub fn load() -> Result<Self, CatalogError> {
        let file = std::env::var_os(CONFIG_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_DEFAULT));
        Self::figment(file).extract::<Config>().map(Config::normalized).map_err(Into::into)
    }

    fn figment(file: PathBuf) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]))
    }

    fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.requests_per_minute = self.requests_per_minute.max(1);
        if !self.api_base_url.path().ends_with('/') {
            let path = format!("{}/", self.api_base_url.path());
            self.api_base_url.set_path(&path);
        }
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.connectivity_probe_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let cfg = Config {
            api_base_url: Url::parse("http://localhost:9000/api").unwrap(),
            page_size: 0,
            ..Config::default()
        }
        .normalized();
        assert_eq!(cfg.api_base_url.as_str(), "http://localhost:9000/api/");
        assert_eq!(cfg.page_size, 1);
    }

    #[test]
    fn env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RMC_PAGE_SIZE", "5");
            jail.set_env("RMC_OFFLINE", "true");
            let cfg: Config = Config::figment(PathBuf::from("missing.toml")).extract()?;
            assert_eq!(cfg.page_size, 5);
            assert!(cfg.offline);
            assert_eq!(cfg.api_base_url.as_str(), DEFAULT_API_BASE_URL);
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_merged() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "catalog.toml",
                r#"
                database_url = "sqlite:other.sqlite"
                loglevel = "debug"
                "#,
            )?;
            let cfg: Config = Config::figment(PathBuf::from("catalog.toml")).extract()?;
            assert_eq!(cfg.database_url, "sqlite:other.sqlite");
            assert_eq!(cfg.loglevel, "debug");
            assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
            Ok(())
        });
    }
}

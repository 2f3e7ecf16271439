use reqwest::StatusCode;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

use crate::domain::CharacterId;

#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("HTTP error {0}")]
    UpstreamStatus(StatusCode),

    #[error("Character {0} not found")]
    CharacterNotFound(CharacterId),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ractor error: {0}")]
    RactorError(String),
}

impl From<figment::Error> for CatalogError {
    fn from(e: figment::Error) -> Self {
        CatalogError::Config(Box::new(e))
    }
}

impl CatalogError {
    /// True when the failure came from the network or the remote API rather
    /// than local storage. The character list offers a retry for these.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            CatalogError::Reqwest(_) | CatalogError::UpstreamStatus(_) | CatalogError::UrlParse(_)
        )
    }
}

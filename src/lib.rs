pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod presentation;
pub mod service;
pub mod types;

pub use app::AppContainer;
pub use config::Config;
pub use error::CatalogError;

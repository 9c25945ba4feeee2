//! Shared domain types, configuration, and the draft store interface for
//! the kurate sourcing pipeline.

pub mod app_config;
pub mod config;
pub mod drafts;
pub mod error;
pub mod scrape;
pub mod store;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use drafts::{
    AiFields, DraftStatus, DraftUpdate, ProductCategory, ProductDraft, TranslationResult,
};
pub use error::{ConfigError, StoreError};
pub use scrape::{ReviewScrapeResult, ScrapeResult};
pub use store::{DraftStore, InMemoryDraftStore};

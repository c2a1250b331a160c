//! Shared configuration, domain types and persisted documents for dealhour.

pub mod app_config;
pub mod categories;
pub mod config;
pub mod deals;
pub mod niches;
pub mod queue;
pub mod settings;
pub mod store;

use thiserror::Error;

pub use app_config::AppConfig;
pub use categories::{load_categories, save_categories};
pub use config::{load_app_config, load_app_config_from_env};
pub use deals::{CandidateDeal, Category, EnrichedDeal, MarketingCopy, NicheTag, Strategy};
pub use niches::{load_niches, parse_niches, Niche, NichesFile};
pub use queue::{clear_queue, load_queue, replace_queue};
pub use settings::{load_settings, save_settings, Settings};
pub use store::{DocumentStore, FileStore, MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read niches file {path}: {source}")]
    NichesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse niches file: {0}")]
    NichesFileParse(#[source] serde_yaml::Error),

    #[error("niche catalog validation failed: {0}")]
    Validation(String),
}

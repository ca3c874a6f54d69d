//! Quarry: a resumable catalog harvester for stone & tile e-commerce sites
//!
//! This crate drives a headless browser through paginated/infinite-scroll
//! product listings, enriches each discovered product from its detail page,
//! and appends validated rows to a CSV file — surviving interruptions by
//! checkpointing which detail pages have already been processed.

pub mod browser;
pub mod checkpoint;
pub mod config;
pub mod pipeline;
pub mod record;
pub mod sink;
pub mod site;

use thiserror::Error;

/// Main error type for quarry operations
#[derive(Debug, Error)]
pub enum QuarryError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("fetch error: {0}")]
    Fetch(#[from] browser::FetchError),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error("output error: {0}")]
    Sink(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for quarry operations
pub type Result<T> = std::result::Result<T, QuarryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{CandidateRecord, CategorySpec, EnrichedRecord};
pub use site::Site;

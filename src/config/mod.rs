//! Configuration module for quarry
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every setting has a sensible default, so a config file is only
//! needed to deviate from them.
//!
//! # Example
//!
//! ```no_run
//! use quarry::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("quarry.toml")).unwrap();
//! println!("Detail retries: {}", config.crawl.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserSettings, CategoryEntry, Config, CrawlSettings, OutputSettings};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

//! Noon-Harvest: a concurrent product search scraper
//!
//! This crate fetches every result page for a search query against a
//! paginated product listing site, extracts structured product records from
//! each page, and merges them into a single ordered CSV export. Fetches run
//! under a bounded-concurrency gate; parsing runs on a blocking worker pool.

pub mod config;
pub mod output;
pub mod search;

use thiserror::Error;

/// Main error type for Noon-Harvest operations
///
/// Only run-fatal conditions appear here. Per-page fetch and parse failures
/// are recoverable: they are logged with the page number and the page simply
/// contributes no records.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize session against {url}: {message}")]
    Init { url: String, message: String },

    #[error("No results found for query: {query} (no request returned an OK status)")]
    NoResults { query: String },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for Noon-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use search::{detect_page_count, extract_products, ProductRecord, SessionContext};

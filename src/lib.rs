//! Catalog Miner: a polite product catalog harvester
//!
//! This crate harvests product listings from independent storefront sources,
//! deduplicates them by a content hash of their canonical URL, and delivers the
//! result to an ingestion endpoint in bounded batches.

pub mod config;
pub mod harvest;
pub mod model;
pub mod output;
pub mod sink;
pub mod source;
pub mod state;

#[cfg(test)]
mod testing;

use thiserror::Error;

/// Main error type for Catalog Miner operations
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("Category discovery failed for {origin}: {source}")]
    Discovery { origin: String, source: SourceError },

    #[error("Category discovery for {origin} returned no categories")]
    NoCategories { origin: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Errors raised by a source adapter while talking to a storefront
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Errors raised while delivering a batch to the ingestion endpoint
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Ingestion endpoint answered HTTP {status}")]
    Rejected { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Ingestion request timed out")]
    Timeout,

    #[error("Failed to serialize batch: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for Catalog Miner operations
pub type Result<T> = std::result::Result<T, MinerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for source adapter operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Result type alias for delivery operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Coordinator, DedupRegistry, FetchPolicy, Orchestrator};
pub use output::RunSummary;
pub use model::{Category, ContentHash, Product};
pub use source::{HtmlSource, JsonSource};
pub use state::{CategoryOutcome, RunState};

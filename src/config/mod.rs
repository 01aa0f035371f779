//! Configuration module for Catalog Miner
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use catalog_miner::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("miner.toml")).unwrap();
//! println!("Harvesting {} sources", config.sources.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, ApiDiscoveryConfig, Config, DiscoveryConfig, HarvestConfig, ItemSelectors,
    SinkConfig, SourceConfig, UserAgentConfig,
};

pub(crate) use validation::compile_selector;

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

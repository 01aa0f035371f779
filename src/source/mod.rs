//! Storefront adapters
//!
//! This module contains:
//! - The `SourceAdapter` trait every storefront implements
//! - A shared HTTP fetcher
//! - `HtmlSource`, a selector-driven adapter configured from TOML
//! - `JsonSource`, a field-path-driven adapter for JSON APIs
//! - Text and price normalization helpers

mod fetcher;
mod html;
mod json;
mod normalize;
mod traits;

pub use fetcher::{build_http_client, fetch_text, user_agent_string};
pub use html::{HtmlSource, HREF_PLACEHOLDER};
pub use json::{JsonSource, SLUG_PLACEHOLDER};
pub use normalize::{clean_text, lowest_price, parse_price};
pub use traits::{ParsedPage, RawPage, SourceAdapter};

use crate::config::SourceConfig;
use crate::ConfigResult;
use reqwest::Client;
use std::sync::Arc;

/// Builds the adapter for a source section: JSON when `[source.api]` is set, HTML otherwise
pub fn build_source(config: &SourceConfig, client: Client) -> ConfigResult<Arc<dyn SourceAdapter>> {
    if config.api.is_some() {
        Ok(Arc::new(JsonSource::from_config(config, client)?))
    } else {
        Ok(Arc::new(HtmlSource::from_config(config, client)?))
    }
}

//! HTTP fetcher shared by HTML sources
//!
//! This module handles:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for listing and landing pages
//! - Classifying failures into `SourceError`

use crate::config::UserAgentConfig;
use crate::SourceError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound for a whole request
///
/// # Example
///
/// ```no_run
/// use catalog_miner::config::UserAgentConfig;
/// use catalog_miner::source::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "CatalogMiner".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "ops@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(120)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(body)` |
/// | unparsable URL | `SourceError::InvalidUrl` |
/// | other status | `SourceError::Http` |
/// | timeout | `SourceError::Timeout` |
/// | connect / body error | `SourceError::Network` |
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, SourceError> {
    let parsed = Url::parse(url).map_err(|e| SourceError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

fn classify_error(url: &str, error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        SourceError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        SourceError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

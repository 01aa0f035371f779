//! Shared fixtures for the integration tests

use catalog_miner::config::{parse_config, Config, UserAgentConfig};
use catalog_miner::Product;
use wiremock::MockServer;

pub const USER_AGENT: &str = "TestMiner/1.0 (+https://example.com/about; admin@example.com)";

pub fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestMiner".to_string(),
        crawler_version: "1.0".to_string(),
        contact_url: "https://example.com/about".to_string(),
        contact_email: "admin@example.com".to_string(),
    }
}

/// Configuration with one discovery-based source pointed at `shop`
pub fn create_test_config(shop: &str, api: &str, batch_size: usize, dedup_by_name: bool) -> Config {
    let content = format!(
        r#"
[harvest]
concurrency = 2
request-timeout-secs = 5
max-jitter-ms = 0

[sink]
endpoint = "{api}/products/"
batch-size = {batch_size}
timeout-secs = 5

[user-agent]
crawler-name = "TestMiner"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[[source]]
origin = "MockShop"
dedup-by-name = {dedup_by_name}

[source.discovery]
url = "{shop}/"
link-selector = "nav a"
page-url-template = "{{href}}?p={{page}}"

[source.selectors]
item = "li.product"
name = "a.title"
link = "a.title"
price = "span.price"
discount-marker = "span.sale"
image = "img"
"#
    );

    parse_config(&content).expect("test config should be valid")
}

/// Configuration with one JSON API source pointed at `shop`, two items per page
pub fn create_api_config(shop: &str, api: &str) -> Config {
    let content = format!(
        r#"
[harvest]
concurrency = 2
request-timeout-secs = 5
max-jitter-ms = 0

[sink]
endpoint = "{api}/products/"
batch-size = 1000
timeout-secs = 5

[user-agent]
crawler-name = "TestMiner"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[[source]]
origin = "MockApi"
page-size = 2

[source.api]
items = "/items"
name = "/name"
link-template = "{shop}/item/{{/name}}-{{/code}}"
price = ["/price", "/offerPrice"]
discount-flag = "/isOnOffer"
image = "/images/0/src"

[source.api.discovery]
url = "{shop}/classifications"
items = "/items"
name = "/name"
slug = "/slug"
page-url-template = "{shop}/articles?take=2&skip={{offset}}&c={{slug}}"
"#
    );

    parse_config(&content).expect("test config should be valid")
}

/// Landing page with one nav link per path
pub fn landing_page(paths: &[&str]) -> String {
    let links: String = paths
        .iter()
        .map(|p| format!(r#"<a href="{}">{}</a>"#, p, p.trim_start_matches('/')))
        .collect();
    format!("<html><body><nav>{}</nav></body></html>", links)
}

/// Listing page; each entry is `(slug, name, price)`
pub fn listing_page(items: &[(&str, &str, &str)]) -> String {
    let cards: String = items
        .iter()
        .map(|(slug, name, price)| {
            format!(
                r#"<li class="product">
                     <a class="title" href="/item/{slug}">{name}</a>
                     <span class="price">{price}</span>
                     <img src="/img/{slug}.jpg">
                   </li>"#
            )
        })
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", cards)
}

/// Products POSTed to the mock ingestion server, one vector per request
pub async fn received_batches(api: &MockServer) -> Vec<Vec<Product>> {
    api.received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).expect("batch should be a JSON array"))
        .collect()
}

use crate::model::Category;
use serde::Deserialize;

/// Main configuration structure for Catalog Miner
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvest: HarvestConfig,
    pub sink: SinkConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Looks up a source by its origin name
    pub fn source(&self, origin: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.origin == origin)
    }
}

/// Harvest behavior shared by all sources
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Default number of category workers running at once
    pub concurrency: u32,

    /// Timeout for a single page request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Upper bound of the random delay before a worker's first request
    #[serde(rename = "max-jitter-ms", default)]
    pub max_jitter_ms: u64,

    /// Delay between consecutive pages of the same category
    #[serde(rename = "page-delay-ms", default)]
    pub page_delay_ms: u64,

    /// Stop a category after this many pages
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

/// Ingestion endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// URL the batches are POSTed to
    pub endpoint: String,

    /// Maximum number of products per request
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Timeout for one delivery request (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// One storefront to harvest
///
/// A source is either an HTML storefront (`[source.selectors]`) or a JSON
/// API (`[source.api]`).
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Value written into every product's `origin`
    pub origin: String,

    /// Overrides `[harvest].concurrency` for this source
    #[serde(default)]
    pub concurrency: Option<u32>,

    /// Drop products whose name was already seen in this run
    #[serde(rename = "dedup-by-name", default)]
    pub dedup_by_name: bool,

    /// Items per page, required when page URLs use `{offset}`
    #[serde(rename = "page-size", default)]
    pub page_size: Option<u32>,

    /// Discover categories from a landing page
    #[serde(default)]
    pub discovery: Option<DiscoveryConfig>,

    /// Fixed category list, used instead of discovery
    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub selectors: Option<ItemSelectors>,

    #[serde(default)]
    pub api: Option<ApiConfig>,
}

impl SourceConfig {
    /// Pool size for this source
    pub fn effective_concurrency(&self, harvest: &HarvestConfig) -> usize {
        self.concurrency.unwrap_or(harvest.concurrency).max(1) as usize
    }
}

/// Landing-page category discovery
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Page listing the categories
    pub url: String,

    /// Selector matching category links (`<a href>`)
    #[serde(rename = "link-selector")]
    pub link_selector: String,

    /// Template for page URLs; `{href}` is the absolute link, `{page}` the page number
    #[serde(rename = "page-url-template")]
    pub page_url_template: String,
}

/// Field locations for a source answering with JSON
///
/// Every path is a JSON pointer (`/items/0/src`); the empty string points at
/// the document root.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Category listing endpoint, used instead of static categories
    #[serde(default)]
    pub discovery: Option<ApiDiscoveryConfig>,

    /// Array of products in a listing response
    #[serde(default)]
    pub items: String,

    /// Product name, relative to the item
    pub name: String,

    /// Absolute or relative product URL
    #[serde(default)]
    pub link: Option<String>,

    /// Product URL built from item fields, e.g. `https://shop/item/{/name}-{/code}`
    ///
    /// Substituted values are lowercased with whitespace replaced by `-`.
    #[serde(rename = "link-template", default)]
    pub link_template: Option<String>,

    /// Price fields; the lowest positive amount wins
    pub price: Vec<String>,

    /// Truthy when the product is on sale
    #[serde(rename = "discount-flag", default)]
    pub discount_flag: Option<String>,

    /// Image URL
    #[serde(default)]
    pub image: Option<String>,

    /// Image used when an item has none
    #[serde(rename = "default-image", default)]
    pub default_image: Option<String>,

    /// Category name carried by the item, overriding the category's own
    #[serde(rename = "category-name", default)]
    pub category_name: Option<String>,
}

/// JSON category listing
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDiscoveryConfig {
    pub url: String,

    /// Array of categories in the response
    #[serde(default)]
    pub items: String,

    /// Category name, relative to the entry
    pub name: String,

    /// Category identifier substituted for `{slug}`
    pub slug: String,

    /// Template for page URLs; needs `{slug}` and `{page}` or `{offset}`
    #[serde(rename = "page-url-template")]
    pub page_url_template: String,
}

/// CSS selectors used to extract products from a listing page
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSelectors {
    /// One match per product card
    pub item: String,

    /// Product name, relative to the item
    pub name: String,

    /// Element carrying the product link in `href`
    pub link: String,

    /// Price amount(s); the lowest parsed amount wins
    pub price: String,

    /// Present only when the product is on sale
    #[serde(rename = "discount-marker", default)]
    pub discount_marker: Option<String>,

    /// Product image element
    pub image: String,

    /// Attributes checked in order for the image URL
    #[serde(rename = "image-attrs", default = "default_image_attrs")]
    pub image_attrs: Vec<String>,
}

fn default_image_attrs() -> Vec<String> {
    vec!["src".to_string()]
}

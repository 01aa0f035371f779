//! Source adapter trait and the page types crossing its boundary

use crate::model::{Category, Product};
use crate::SourceResult;
use async_trait::async_trait;

/// A fetched but not yet parsed listing page
#[derive(Debug, Clone)]
pub struct RawPage {
    /// URL the page was fetched from
    pub url: String,

    /// Page number within its category (1-based)
    pub page: u32,

    /// Response body
    pub body: String,
}

/// Products extracted from one page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Successfully normalized products, in page order
    pub products: Vec<Product>,

    /// Listings present on the page that could not be parsed
    pub skipped: usize,
}

impl ParsedPage {
    /// Returns true when the page carried no listings at all
    ///
    /// A page whose listings were all malformed is not exhausted; pagination
    /// continues past it.
    pub fn is_exhausted(&self) -> bool {
        self.products.is_empty() && self.skipped == 0
    }

    /// Number of listings seen on the page
    pub fn item_count(&self) -> usize {
        self.products.len() + self.skipped
    }
}

/// Trait for storefront adapters
///
/// One implementation per source. Implementations must be safe to share
/// across category workers.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Name written into every product's `origin`
    fn origin(&self) -> &str;

    /// Enumerates the categories to harvest; called once per run
    async fn discover_categories(&self) -> SourceResult<Vec<Category>>;

    /// Fetches page `page` of `category`
    ///
    /// Any non-success response must be returned as an error.
    async fn fetch_page(&self, category: &Category, page: u32) -> SourceResult<RawPage>;

    /// Normalizes a fetched page into products, skipping malformed listings
    fn parse_page(&self, category: &Category, page: &RawPage) -> ParsedPage;
}

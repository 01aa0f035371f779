//! Selector-driven HTML storefront adapter
//!
//! Categories come either from a landing page (every link matched by the
//! discovery selector) or from a fixed list in the configuration. Listing
//! pages are parsed with one CSS selector per product field.

use crate::config::{compile_selector, DiscoveryConfig, ItemSelectors, SourceConfig};
use crate::model::{Category, Product};
use crate::source::fetcher::fetch_text;
use crate::source::normalize::{clean_text, lowest_price, resolve_link};
use crate::source::traits::{ParsedPage, RawPage, SourceAdapter};
use crate::{ConfigError, ConfigResult, SourceResult};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Placeholder substituted with the absolute category link during discovery
pub const HREF_PLACEHOLDER: &str = "{href}";

/// Generic adapter for storefronts that render listings as HTML
pub struct HtmlSource {
    origin: String,
    client: Client,
    discovery: Option<Discovery>,
    categories: Vec<Category>,
    selectors: CompiledSelectors,
    page_size: Option<u32>,
}

struct Discovery {
    url: Url,
    link: Selector,
    page_url_template: String,
}

struct CompiledSelectors {
    item: Selector,
    name: Selector,
    link: Selector,
    price: Selector,
    discount_marker: Option<Selector>,
    image: Selector,
    image_attrs: Vec<String>,
}

impl HtmlSource {
    /// Builds an adapter from a source section, compiling all selectors up front
    ///
    /// # Arguments
    ///
    /// * `config` - The source configuration
    /// * `client` - Shared HTTP client (see `build_http_client`)
    pub fn from_config(config: &SourceConfig, client: Client) -> ConfigResult<Self> {
        let selectors = config.selectors.as_ref().ok_or_else(|| {
            ConfigError::Validation(format!(
                "source '{}' has no [source.selectors]",
                config.origin
            ))
        })?;
        let discovery = config
            .discovery
            .as_ref()
            .map(Discovery::compile)
            .transpose()?;

        Ok(Self {
            origin: config.origin.clone(),
            client,
            discovery,
            categories: config
                .categories
                .iter()
                .cloned()
                .map(|c| c.with_page_size(config.page_size))
                .collect(),
            selectors: CompiledSelectors::compile(selectors)?,
            page_size: config.page_size,
        })
    }

    /// Extracts categories from a landing page body
    ///
    /// Links are resolved against the landing URL. Categories whose page URL
    /// template repeats an earlier one are dropped.
    fn categories_from_landing(&self, discovery: &Discovery, body: &str) -> Vec<Category> {
        let document = Html::parse_document(body);
        let mut seen = HashSet::new();
        let mut categories = Vec::new();

        for element in document.select(&discovery.link) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(absolute) = resolve_link(href, Some(&discovery.url)) else {
                continue;
            };

            let template = discovery
                .page_url_template
                .replace(HREF_PLACEHOLDER, &absolute);
            if !seen.insert(template.clone()) {
                tracing::trace!("Skipping repeated category link {}", absolute);
                continue;
            }

            let mut name = clean_text(&element.text().collect::<String>());
            if name.is_empty() {
                name = absolute.clone();
            }
            let slug = Url::parse(&absolute)
                .map(|u| u.path().to_string())
                .unwrap_or_else(|_| absolute.clone());

            categories.push(Category::new(name, slug, template).with_page_size(self.page_size));
        }

        categories
    }

    /// Builds one product from a listing element, or `None` if a required field is missing
    fn parse_item(
        &self,
        item: ElementRef<'_>,
        category: &Category,
        base: Option<&Url>,
    ) -> Option<Product> {
        let s = &self.selectors;

        let name = item
            .select(&s.name)
            .next()
            .map(|e| clean_text(&e.text().collect::<String>()))
            .filter(|n| !n.is_empty())?;

        let product_url = item
            .select(&s.link)
            .next()
            .and_then(|e| e.value().attr("href"))
            .and_then(|href| resolve_link(href, base))?;

        let price_texts: Vec<String> = item
            .select(&s.price)
            .map(|e| e.text().collect::<String>())
            .collect();
        let price = lowest_price(price_texts.iter().map(String::as_str))?;

        let is_discounted = s
            .discount_marker
            .as_ref()
            .map(|marker| item.select(marker).next().is_some())
            .unwrap_or(false);

        let image_url = item
            .select(&s.image)
            .next()
            .and_then(|img| {
                s.image_attrs
                    .iter()
                    .filter_map(|attr| img.value().attr(attr))
                    .find(|v| !v.trim().is_empty())
            })
            .and_then(|src| resolve_link(src, base))
            .unwrap_or_default();

        Some(Product::new(
            self.origin.as_str(),
            name,
            price,
            is_discounted,
            image_url,
            &product_url,
            category.name.as_str(),
        ))
    }
}

#[async_trait]
impl SourceAdapter for HtmlSource {
    fn origin(&self) -> &str {
        &self.origin
    }

    async fn discover_categories(&self) -> SourceResult<Vec<Category>> {
        let Some(discovery) = &self.discovery else {
            return Ok(self.categories.clone());
        };

        tracing::debug!("Discovering categories from {}", discovery.url);
        let body = fetch_text(&self.client, discovery.url.as_str()).await?;
        let categories = self.categories_from_landing(discovery, &body);
        tracing::debug!(
            "Found {} categories on {}",
            categories.len(),
            discovery.url
        );

        Ok(categories)
    }

    async fn fetch_page(&self, category: &Category, page: u32) -> SourceResult<RawPage> {
        let url = category.page_url(page);
        tracing::trace!("GET {}", url);
        let body = fetch_text(&self.client, &url).await?;
        Ok(RawPage { url, page, body })
    }

    fn parse_page(&self, category: &Category, page: &RawPage) -> ParsedPage {
        let document = Html::parse_document(&page.body);
        let base = Url::parse(&page.url).ok();
        let mut parsed = ParsedPage::default();

        for item in document.select(&self.selectors.item) {
            match self.parse_item(item, category, base.as_ref()) {
                Some(product) => parsed.products.push(product),
                None => parsed.skipped += 1,
            }
        }

        if parsed.skipped > 0 {
            tracing::debug!(
                "Skipped {} malformed listings on {}",
                parsed.skipped,
                page.url
            );
        }

        parsed
    }
}

impl Discovery {
    fn compile(config: &DiscoveryConfig) -> ConfigResult<Self> {
        let url = Url::parse(&config.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.url, e)))?;

        Ok(Self {
            url,
            link: compile_selector(&config.link_selector)?,
            page_url_template: config.page_url_template.clone(),
        })
    }
}

impl CompiledSelectors {
    fn compile(config: &ItemSelectors) -> ConfigResult<Self> {
        Ok(Self {
            item: compile_selector(&config.item)?,
            name: compile_selector(&config.name)?,
            link: compile_selector(&config.link)?,
            price: compile_selector(&config.price)?,
            discount_marker: config
                .discount_marker
                .as_deref()
                .map(compile_selector)
                .transpose()?,
            image: compile_selector(&config.image)?,
            image_attrs: config.image_attrs.clone(),
        })
    }
}

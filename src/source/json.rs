//! JSON API storefront adapter
//!
//! Listings, and optionally the category list, come from JSON endpoints.
//! Fields are located with JSON pointers configured per source.

use crate::config::{ApiConfig, ApiDiscoveryConfig, SourceConfig};
use crate::model::{Category, Product};
use crate::source::fetcher::fetch_text;
use crate::source::normalize::{clean_text, parse_price, resolve_link};
use crate::source::traits::{ParsedPage, RawPage, SourceAdapter};
use crate::{ConfigError, ConfigResult, SourceError, SourceResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// Placeholder substituted with the category slug during discovery
pub const SLUG_PLACEHOLDER: &str = "{slug}";

/// Generic adapter for storefronts backed by a JSON API
pub struct JsonSource {
    origin: String,
    client: Client,
    api: ApiConfig,
    categories: Vec<Category>,
    page_size: Option<u32>,
}

impl JsonSource {
    pub fn from_config(config: &SourceConfig, client: Client) -> ConfigResult<Self> {
        let api = config.api.clone().ok_or_else(|| {
            ConfigError::Validation(format!("source '{}' has no [source.api]", config.origin))
        })?;

        Ok(Self {
            origin: config.origin.clone(),
            client,
            api,
            categories: config
                .categories
                .iter()
                .cloned()
                .map(|c| c.with_page_size(config.page_size))
                .collect(),
            page_size: config.page_size,
        })
    }

    fn categories_from_listing(
        &self,
        discovery: &ApiDiscoveryConfig,
        body: &str,
    ) -> SourceResult<Vec<Category>> {
        let document = parse_document(&discovery.url, body)?;
        let entries = array_at(&document, &discovery.items, &discovery.url)?;

        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for entry in entries {
            let (Some(name), Some(slug)) = (
                text_at(entry, &discovery.name),
                text_at(entry, &discovery.slug),
            ) else {
                tracing::trace!("Skipping category entry without name or slug");
                continue;
            };

            let template = discovery.page_url_template.replace(SLUG_PLACEHOLDER, &slug);
            if !seen.insert(template.clone()) {
                continue;
            }
            categories.push(Category::new(name, slug, template).with_page_size(self.page_size));
        }

        Ok(categories)
    }

    /// Builds one product from a listing entry, or `None` if a required field is missing
    fn parse_item(&self, item: &Value, category: &Category, base: Option<&Url>) -> Option<Product> {
        let api = &self.api;

        let name = text_at(item, &api.name)?;

        let link = match (&api.link, &api.link_template) {
            (Some(pointer), _) => text_at(item, pointer)?,
            (None, Some(template)) => expand_link_template(template, item)?,
            (None, None) => return None,
        };
        let product_url = resolve_link(&link, base)?;

        let price = api
            .price
            .iter()
            .filter_map(|pointer| item.pointer(pointer))
            .filter_map(amount)
            .filter(|amount| *amount > 0)
            .min()?;

        let is_discounted = api
            .discount_flag
            .as_deref()
            .and_then(|pointer| item.pointer(pointer))
            .map(is_truthy)
            .unwrap_or(false);

        let image_url = api
            .image
            .as_deref()
            .and_then(|pointer| text_at(item, pointer))
            .and_then(|src| resolve_link(&src, base))
            .or_else(|| api.default_image.clone())
            .unwrap_or_default();

        let category_name = api
            .category_name
            .as_deref()
            .and_then(|pointer| text_at(item, pointer))
            .unwrap_or_else(|| category.name.clone());

        Some(Product::new(
            self.origin.as_str(),
            name,
            price,
            is_discounted,
            image_url,
            &product_url,
            category_name,
        ))
    }
}

#[async_trait]
impl SourceAdapter for JsonSource {
    fn origin(&self) -> &str {
        &self.origin
    }

    async fn discover_categories(&self) -> SourceResult<Vec<Category>> {
        let Some(discovery) = &self.api.discovery else {
            return Ok(self.categories.clone());
        };

        tracing::debug!("Listing categories from {}", discovery.url);
        let body = fetch_text(&self.client, &discovery.url).await?;
        let categories = self.categories_from_listing(discovery, &body)?;
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

        // A body without the item array is a failed page, not an empty one
        let document = parse_document(&url, &body)?;
        array_at(&document, &self.api.items, &url)?;

        Ok(RawPage { url, page, body })
    }

    fn parse_page(&self, category: &Category, page: &RawPage) -> ParsedPage {
        let items = match parse_document(&page.url, &page.body)
            .and_then(|document| array_at(&document, &self.api.items, &page.url).cloned())
        {
            Ok(items) => items,
            Err(e) => {
                // Counted as skipped so the page is not mistaken for the last one
                tracing::warn!("{}", e);
                return ParsedPage {
                    products: Vec::new(),
                    skipped: 1,
                };
            }
        };

        let mut parsed = ParsedPage::default();
        let base = Url::parse(&page.url).ok();
        for item in &items {
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

fn parse_document(url: &str, body: &str) -> SourceResult<Value> {
    serde_json::from_str(body).map_err(|e| SourceError::Parse {
        url: url.to_string(),
        message: format!("invalid JSON: {}", e),
    })
}

fn array_at<'a>(document: &'a Value, pointer: &str, url: &str) -> SourceResult<&'a Vec<Value>> {
    document
        .pointer(pointer)
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Parse {
            url: url.to_string(),
            message: format!("no array at '{}'", pointer),
        })
}

/// Non-empty text of a string or number field
fn text_at(value: &Value, pointer: &str) -> Option<String> {
    let text = match value.pointer(pointer)? {
        Value::String(s) => clean_text(s),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(text).filter(|t| !t.is_empty())
}

/// Whole currency units of a numeric or displayed price
fn amount(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
        }
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Expands `{/pointer}` placeholders with slugified item fields
fn expand_link_template(template: &str, item: &Value) -> Option<String> {
    let mut link = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{/") {
        link.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}')?;
        let value = text_at(item, &after[..end])?;
        link.push_str(&slugify(&value));
        rest = &after[end + 1..];
    }
    link.push_str(rest);

    Some(link)
}

fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

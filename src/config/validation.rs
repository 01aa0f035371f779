use crate::config::types::{
    ApiConfig, Config, HarvestConfig, ItemSelectors, SinkConfig, SourceConfig, UserAgentConfig,
};
use crate::model::{OFFSET_PLACEHOLDER, PAGE_PLACEHOLDER};
use crate::source::{HREF_PLACEHOLDER, SLUG_PLACEHOLDER};
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Largest worker pool a source may ask for
const MAX_CONCURRENCY: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_sink_config(&config.sink)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_sources(&config.sources)?;
    Ok(())
}

/// Validates harvest configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    validate_concurrency(config.concurrency, "harvest.concurrency")?;

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_concurrency(value: u32, field: &str) -> Result<(), ConfigError> {
    if value < 1 || value > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            field, MAX_CONCURRENCY, value
        )));
    }
    Ok(())
}

/// Validates sink configuration
fn validate_sink_config(config: &SinkConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid sink endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Sink endpoint must be HTTP or HTTPS, got '{}'",
            config.endpoint
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(
            "batch_size must be >= 1".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "sink timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates every source entry and origin uniqueness
fn validate_sources(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[source]] must be configured".to_string(),
        ));
    }

    let mut origins = HashSet::new();
    for source in sources {
        if source.origin.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source origin cannot be empty".to_string(),
            ));
        }

        if !origins.insert(source.origin.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source origin '{}'",
                source.origin
            )));
        }

        validate_source(source)?;
    }

    Ok(())
}

fn validate_source(source: &SourceConfig) -> Result<(), ConfigError> {
    let origin = source.origin.as_str();

    if let Some(concurrency) = source.concurrency {
        validate_concurrency(concurrency, &format!("{}.concurrency", origin))?;
    }

    if source.page_size == Some(0) {
        return Err(ConfigError::Validation(format!(
            "source '{}' page-size must be >= 1",
            origin
        )));
    }

    let api_discovery = source.api.as_ref().and_then(|api| api.discovery.as_ref());
    let discovery_count =
        usize::from(source.discovery.is_some()) + usize::from(api_discovery.is_some());
    match (discovery_count, source.categories.is_empty()) {
        (0, true) => {
            return Err(ConfigError::Validation(format!(
                "source '{}' needs either discovery or [[source.categories]]",
                origin
            )));
        }
        (0, false) => {}
        (_, false) => {
            return Err(ConfigError::Validation(format!(
                "source '{}' cannot have both discovery and static categories",
                origin
            )));
        }
        _ => {}
    }

    match (&source.selectors, &source.api) {
        (Some(selectors), None) => validate_item_selectors(selectors)?,
        (None, Some(api)) => validate_api(api, source)?,
        _ => {
            return Err(ConfigError::Validation(format!(
                "source '{}' needs exactly one of [source.selectors] or [source.api]",
                origin
            )));
        }
    }

    if let Some(discovery) = &source.discovery {
        if source.selectors.is_none() {
            return Err(ConfigError::Validation(format!(
                "source '{}': [source.discovery] is for HTML sources; use [source.api.discovery]",
                origin
            )));
        }
        validate_url(&discovery.url, "discovery URL")?;
        compile_selector(&discovery.link_selector)?;
        validate_template(&discovery.page_url_template, source)?;
        require_placeholder(&discovery.page_url_template, HREF_PLACEHOLDER, origin)?;
    }

    for category in &source.categories {
        if category.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' has a category without a name",
                origin
            )));
        }
        validate_template(&category.page_url_template, source)?;
    }

    Ok(())
}

fn validate_api(api: &ApiConfig, source: &SourceConfig) -> Result<(), ConfigError> {
    let origin = source.origin.as_str();

    if let Some(discovery) = &api.discovery {
        validate_url(&discovery.url, "category API URL")?;
        for pointer in [&discovery.items, &discovery.name, &discovery.slug] {
            validate_pointer(pointer, origin)?;
        }
        validate_template(&discovery.page_url_template, source)?;
        require_placeholder(&discovery.page_url_template, SLUG_PLACEHOLDER, origin)?;
    }

    let pointers = [&api.items, &api.name]
        .into_iter()
        .chain(api.link.iter())
        .chain(api.price.iter())
        .chain(api.discount_flag.iter())
        .chain(api.image.iter())
        .chain(api.category_name.iter());
    for pointer in pointers {
        validate_pointer(pointer, origin)?;
    }

    match (&api.link, &api.link_template) {
        (Some(_), None) => {}
        (None, Some(template)) => {
            if !template.contains("{/") {
                return Err(ConfigError::Validation(format!(
                    "link-template '{}' of source '{}' references no item field",
                    template, origin
                )));
            }
        }
        _ => {
            return Err(ConfigError::Validation(format!(
                "source '{}' needs exactly one of api.link or api.link-template",
                origin
            )));
        }
    }

    if api.price.is_empty() {
        return Err(ConfigError::Validation(format!(
            "source '{}' needs at least one api.price field",
            origin
        )));
    }

    Ok(())
}

fn validate_url(url: &str, what: &str) -> Result<(), ConfigError> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, url, e)))
}

/// Checks that a page URL template can produce distinct pages
///
/// `{offset}` only expands when the source sets `page-size`.
fn validate_template(template: &str, source: &SourceConfig) -> Result<(), ConfigError> {
    let has_page = template.contains(PAGE_PLACEHOLDER);
    let has_offset = template.contains(OFFSET_PLACEHOLDER);

    if !has_page && !has_offset {
        return Err(ConfigError::Validation(format!(
            "page URL template '{}' of source '{}' must contain {} or {}",
            template, source.origin, PAGE_PLACEHOLDER, OFFSET_PLACEHOLDER
        )));
    }

    if has_offset && source.page_size.is_none() {
        return Err(ConfigError::Validation(format!(
            "page URL template '{}' of source '{}' uses {} but page-size is not set",
            template, source.origin, OFFSET_PLACEHOLDER
        )));
    }

    Ok(())
}

/// Discovery templates must vary per category, or every category collapses into one
fn require_placeholder(template: &str, placeholder: &str, origin: &str) -> Result<(), ConfigError> {
    if !template.contains(placeholder) {
        return Err(ConfigError::Validation(format!(
            "discovery template '{}' of source '{}' must contain {}",
            template, origin, placeholder
        )));
    }
    Ok(())
}

fn validate_pointer(pointer: &str, origin: &str) -> Result<(), ConfigError> {
    if !pointer.is_empty() && !pointer.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "field path '{}' of source '{}' must be empty or start with '/'",
            pointer, origin
        )));
    }
    Ok(())
}

fn validate_item_selectors(selectors: &ItemSelectors) -> Result<(), ConfigError> {
    for selector in [
        &selectors.item,
        &selectors.name,
        &selectors.link,
        &selectors.price,
        &selectors.image,
    ] {
        compile_selector(selector)?;
    }

    if let Some(marker) = &selectors.discount_marker {
        compile_selector(marker)?;
    }

    if selectors.image_attrs.is_empty() {
        return Err(ConfigError::Validation(
            "image_attrs cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Parses a CSS selector, reporting failures as configuration errors
pub(crate) fn compile_selector(selector: &str) -> ConfigResult<Selector> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

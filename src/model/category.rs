use serde::Deserialize;

/// Placeholder substituted with the 1-based page number
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Placeholder substituted with the number of items on earlier pages
///
/// Requires a page size; page `n` starts at offset `(n - 1) * page_size`.
pub const OFFSET_PLACEHOLDER: &str = "{offset}";

/// A site-defined product grouping, the unit of pagination
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    /// Display name, copied into every product's `category_name`
    pub name: String,

    /// Site path or identifier of the category
    pub slug: String,

    /// URL template containing `{page}` or `{offset}`
    #[serde(rename = "page-url-template")]
    pub page_url_template: String,

    /// Items per page, used to expand `{offset}`
    #[serde(skip)]
    pub page_size: Option<u32>,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        page_url_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            page_url_template: page_url_template.into(),
            page_size: None,
        }
    }

    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// URL of page `page` of this category
    pub fn page_url(&self, page: u32) -> String {
        let url = self
            .page_url_template
            .replace(PAGE_PLACEHOLDER, &page.to_string());

        match self.page_size {
            Some(size) => {
                let offset = u64::from(page.saturating_sub(1)) * u64::from(size);
                url.replace(OFFSET_PLACEHOLDER, &offset.to_string())
            }
            None => url,
        }
    }
}

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

/// Stable identity of a product: hex SHA-256 of its canonical URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hashes an already canonical product URL
    pub fn of_canonical(canonical_url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical_url.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Canonicalizes `raw_url` and hashes the result
    pub fn of_url(raw_url: &str) -> Self {
        Self::of_canonical(&canonical_url(raw_url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces the canonical form of a product URL
///
/// Absolute URLs go through the `url` crate serializer (lowercased scheme and
/// host, default port dropped, percent-encoding normalized) with the fragment
/// removed. Anything that does not parse is only trimmed.
///
/// # Examples
///
/// ```
/// use catalog_miner::model::canonical_url;
///
/// assert_eq!(
///     canonical_url("  HTTPS://Shop.Example.com:443/item/1#reviews "),
///     "https://shop.example.com/item/1"
/// );
/// ```
pub fn canonical_url(raw_url: &str) -> String {
    let trimmed = raw_url.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}

/// Canonical product record shared by every source
///
/// Serializes to the flat JSON object the ingestion endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ContentHash,
    pub origin: String,
    pub name: String,
    /// Price in the smallest displayed currency unit
    pub price: u64,
    pub is_discounted: bool,
    pub image_url: String,
    pub product_url: String,
    pub category_name: String,
}

impl Product {
    /// Builds a product, canonicalizing its URL and deriving its id
    pub fn new(
        origin: impl Into<String>,
        name: impl Into<String>,
        price: u64,
        is_discounted: bool,
        image_url: impl Into<String>,
        product_url: &str,
        category_name: impl Into<String>,
    ) -> Self {
        let product_url = canonical_url(product_url);
        Self {
            id: ContentHash::of_canonical(&product_url),
            origin: origin.into(),
            name: name.into(),
            price,
            is_discounted,
            image_url: image_url.into(),
            product_url,
            category_name: category_name.into(),
        }
    }
}

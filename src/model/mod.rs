//! Data model shared by sources, the harvest pipeline, and the sink
//!
//! - `Category`: a paginated product listing on a source site
//! - `Product`: the canonical record every source normalizes into
//! - `ContentHash`: the URL-derived identity used for deduplication

mod category;
mod product;

pub use category::{Category, OFFSET_PLACEHOLDER, PAGE_PLACEHOLDER};
pub use product::{canonical_url, ContentHash, Product};

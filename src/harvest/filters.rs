//! Source-specific filters applied before registry insertion

use crate::model::Product;
use crate::source::clean_text;
use std::collections::HashSet;

/// Drops products whose name was already accepted in this run
///
/// Some storefronts list the same item under several URLs. Names are compared
/// after whitespace cleanup and case folding.
#[derive(Debug, Default)]
pub struct NameDedupFilter {
    seen: HashSet<String>,
}

impl NameDedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and remembers the name if it has not been seen before
    pub fn accept(&mut self, product: &Product) -> bool {
        self.seen.insert(name_key(&product.name))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

fn name_key(name: &str) -> String {
    clean_text(name).to_lowercase()
}

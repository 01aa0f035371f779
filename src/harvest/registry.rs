//! Content-addressed deduplication registry

use crate::model::{ContentHash, Product};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Per-run map from content hash to the first product seen with it
///
/// `insert` may be called from any number of tasks. The lock covers only the
/// lookup and the insertion itself.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    inner: Mutex<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    /// id -> position in `products`
    positions: HashMap<ContentHash, usize>,
    products: Vec<Product>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `product` unless its id is already present
    ///
    /// # Returns
    ///
    /// `true` if the product was stored, `false` if it was a duplicate and
    /// has been dropped. The stored entry is never replaced or merged.
    pub fn insert(&self, product: Product) -> bool {
        let mut entries = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.positions.contains_key(&product.id) {
            return false;
        }
        let position = entries.products.len();
        entries.positions.insert(product.id.clone(), position);
        entries.products.push(product);
        true
    }

    pub fn contains(&self, id: &ContentHash) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .positions
            .contains_key(id)
    }

    /// Returns the stored product for `id`
    pub fn get(&self, id: &ContentHash) -> Option<Product> {
        let entries = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .positions
            .get(id)
            .map(|&position| entries.products[position].clone())
    }

    /// Copy of every stored product in insertion order
    pub fn snapshot(&self) -> Vec<Product> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

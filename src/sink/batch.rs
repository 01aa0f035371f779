//! Chunked delivery of a product snapshot

use crate::model::Product;
use crate::sink::IngestEndpoint;
use std::sync::Arc;

/// Result of delivering one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Zero-based position of the batch within the delivery
    pub index: usize,

    /// Number of products in the batch
    pub size: usize,

    /// Failure description, `None` when the endpoint accepted the batch
    pub error: Option<String>,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Splits `products` into consecutive slices of at most `batch_size`
///
/// A `batch_size` of zero is treated as one.
pub fn partition(products: &[Product], batch_size: usize) -> std::slice::Chunks<'_, Product> {
    products.chunks(batch_size.max(1))
}

/// Delivers products to an ingestion endpoint in independent batches
pub struct BatchSink {
    endpoint: Arc<dyn IngestEndpoint>,
}

impl BatchSink {
    pub fn new(endpoint: Arc<dyn IngestEndpoint>) -> Self {
        Self { endpoint }
    }

    /// Sends every batch in order and reports each one's result
    ///
    /// A failed batch is logged and the next one is still attempted. Failed
    /// batches are not retried.
    ///
    /// # Arguments
    ///
    /// * `products` - The snapshot to deliver
    /// * `batch_size` - Maximum number of products per request
    ///
    /// # Returns
    ///
    /// One `BatchResult` per batch, `ceil(products.len() / batch_size)` in total
    pub async fn deliver(&self, products: &[Product], batch_size: usize) -> Vec<BatchResult> {
        let batches: Vec<&[Product]> = partition(products, batch_size).collect();
        let total = batches.len();
        let mut results = Vec::with_capacity(total);

        for (index, batch) in batches.into_iter().enumerate() {
            let error = match self.endpoint.submit(batch).await {
                Ok(()) => {
                    tracing::info!(
                        "Delivered batch {}/{} ({} products)",
                        index + 1,
                        total,
                        batch.len()
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!("Batch {}/{} failed: {}", index + 1, total, e);
                    Some(e.to_string())
                }
            };

            results.push(BatchResult {
                index,
                size: batch.len(),
                error,
            });
        }

        results
    }
}

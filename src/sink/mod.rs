//! Delivery of deduplicated products to the ingestion API
//!
//! This module handles:
//! - The `IngestEndpoint` trait and its HTTP implementation
//! - Splitting a snapshot into bounded batches
//! - Sending batches independently and recording each result

mod batch;
mod http;

pub use batch::{partition, BatchResult, BatchSink};
pub use http::HttpIngestEndpoint;

use crate::model::Product;
use crate::SinkResult;
use async_trait::async_trait;

/// Downstream receiver of product batches
#[async_trait]
pub trait IngestEndpoint: Send + Sync {
    /// Delivers one batch; any error marks the whole batch as failed
    async fn submit(&self, products: &[Product]) -> SinkResult<()>;
}

//! Category worker: drives one category's pagination loop to exhaustion

use crate::harvest::FetchPolicy;
use crate::model::{Category, Product};
use crate::source::SourceAdapter;
use crate::state::CategoryOutcome;
use std::sync::Arc;

/// Everything one category contributed to a run
#[derive(Debug, Clone)]
pub struct CategoryHarvest {
    pub category: Category,

    /// Products in page order; pages after a failure are absent
    pub products: Vec<Product>,

    pub outcome: CategoryOutcome,

    /// Pages that answered successfully, the exhausted page included
    pub pages_fetched: u32,

    /// Listings dropped because they could not be parsed
    pub items_skipped: usize,
}

impl CategoryHarvest {
    /// Empty total failure, used when the worker never produced a result
    pub fn failed(category: Category, reason: impl Into<String>) -> Self {
        Self {
            category,
            products: Vec::new(),
            outcome: CategoryOutcome::TotalFailure {
                reason: reason.into(),
            },
            pages_fetched: 0,
            items_skipped: 0,
        }
    }
}

/// Paginates a single category against a source adapter
///
/// Workers share nothing mutable with each other; each `run` owns its
/// accumulating product list.
pub struct CategoryWorker {
    source: Arc<dyn SourceAdapter>,
    policy: FetchPolicy,
}

impl CategoryWorker {
    pub fn new(source: Arc<dyn SourceAdapter>, policy: FetchPolicy) -> Self {
        Self { source, policy }
    }

    /// Harvests `category`, requesting pages 1, 2, 3, ... until one is empty
    ///
    /// A failed first page yields `TotalFailure`. A failure on any later page
    /// yields `PartialFailure` and keeps everything collected before it.
    /// Failed pages are not retried.
    pub async fn run(&self, category: Category) -> CategoryHarvest {
        let jitter = self.policy.sample_jitter();
        if !jitter.is_zero() {
            tracing::trace!("Waiting {:?} before harvesting {}", jitter, category.name);
            tokio::time::sleep(jitter).await;
        }

        let mut products = Vec::new();
        let mut pages_fetched = 0u32;
        let mut items_skipped = 0usize;
        let mut page = 1u32;

        let outcome = loop {
            if page > 1 && !self.policy.page_delay.is_zero() {
                tokio::time::sleep(self.policy.page_delay).await;
            }

            let request = self.source.fetch_page(&category, page);
            let raw = match tokio::time::timeout(self.policy.request_timeout, request).await {
                Ok(Ok(raw)) => raw,
                Ok(Err(e)) => break CategoryOutcome::failed_at(page, e.to_string()),
                Err(_) => {
                    break CategoryOutcome::failed_at(
                        page,
                        format!(
                            "page {} timed out after {:?}",
                            page, self.policy.request_timeout
                        ),
                    )
                }
            };
            pages_fetched += 1;

            let parsed = self.source.parse_page(&category, &raw);
            if parsed.is_exhausted() {
                tracing::debug!("{} exhausted at page {}", category.name, page);
                break CategoryOutcome::Complete;
            }

            tracing::trace!(
                "{} page {}: {} products, {} skipped",
                category.name,
                page,
                parsed.products.len(),
                parsed.skipped
            );
            items_skipped += parsed.skipped;
            products.extend(parsed.products);

            if self.policy.reached_page_cap(pages_fetched) {
                tracing::warn!(
                    "{} reached the page cap of {} pages, stopping",
                    category.name,
                    pages_fetched
                );
                break CategoryOutcome::Complete;
            }

            page += 1;
        };

        CategoryHarvest {
            category,
            products,
            outcome,
            pages_fetched,
            items_skipped,
        }
    }
}

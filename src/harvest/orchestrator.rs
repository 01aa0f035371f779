//! Bounded pool of category workers

use crate::harvest::worker::{CategoryHarvest, CategoryWorker};
use crate::harvest::FetchPolicy;
use crate::model::Category;
use crate::source::SourceAdapter;
use crate::state::CategoryOutcome;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Runs category workers with at most `concurrency` active at once
///
/// Each category gets its own task. Tasks wait on a shared semaphore, so the
/// next pending category starts as soon as a running one finishes.
pub struct Orchestrator {
    source: Arc<dyn SourceAdapter>,
    policy: FetchPolicy,
    concurrency: usize,
}

impl Orchestrator {
    /// Creates an orchestrator; a concurrency of zero is treated as one
    pub fn new(source: Arc<dyn SourceAdapter>, policy: FetchPolicy, concurrency: usize) -> Self {
        Self {
            source,
            policy,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Starts one task per category and streams results as they finish
    ///
    /// The receiver yields exactly one `CategoryHarvest` per category, in
    /// completion order, then closes. A panicking worker is reported as a
    /// total failure of its category.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(&self, categories: Vec<Category>) -> mpsc::UnboundedReceiver<CategoryHarvest> {
        let (tx, rx) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let worker = Arc::new(CategoryWorker::new(
            self.source.clone(),
            self.policy.clone(),
        ));

        tracing::info!(
            "Harvesting {} categories from {} with {} workers",
            categories.len(),
            self.source.origin(),
            self.concurrency
        );

        for category in categories {
            let tx = tx.clone();
            let semaphore = semaphore.clone();
            let worker = worker.clone();

            tokio::spawn(async move {
                let harvest = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        match AssertUnwindSafe(worker.run(category.clone()))
                            .catch_unwind()
                            .await
                        {
                            Ok(harvest) => harvest,
                            Err(panic) => {
                                let reason = panic_message(&*panic);
                                tracing::error!(
                                    "Worker for {} panicked: {}",
                                    category.name,
                                    reason
                                );
                                CategoryHarvest::failed(
                                    category,
                                    format!("worker panicked: {}", reason),
                                )
                            }
                        }
                    }
                    Err(_) => CategoryHarvest::failed(category, "worker pool closed"),
                };

                log_outcome(&harvest);
                // The receiver may be gone if the caller stopped listening
                let _ = tx.send(harvest);
            });
        }

        rx
    }

    /// Harvests every category and returns the results in completion order
    pub async fn harvest(&self, categories: Vec<Category>) -> Vec<CategoryHarvest> {
        let expected = categories.len();
        let mut rx = self.spawn(categories);
        let mut results = Vec::with_capacity(expected);
        while let Some(harvest) = rx.recv().await {
            results.push(harvest);
        }
        results
    }
}

fn log_outcome(harvest: &CategoryHarvest) {
    let name = &harvest.category.name;
    match &harvest.outcome {
        CategoryOutcome::Complete => tracing::info!(
            "{}: {} products over {} pages",
            name,
            harvest.products.len(),
            harvest.pages_fetched
        ),
        CategoryOutcome::PartialFailure { .. } => tracing::warn!(
            "{}: kept {} products, {}",
            name,
            harvest.products.len(),
            harvest.outcome
        ),
        CategoryOutcome::TotalFailure { .. } => {
            tracing::warn!("{}: {}", name, harvest.outcome)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

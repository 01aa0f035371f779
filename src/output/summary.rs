//! Run summary accumulated by the coordinator

use crate::harvest::CategoryHarvest;
use crate::sink::BatchResult;
use crate::state::{CategoryOutcome, RunState};
use chrono::{DateTime, Utc};

/// A category that did not finish cleanly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFailure {
    pub category: String,
    pub outcome: CategoryOutcome,
    /// Products kept from the pages before the failure
    pub products_kept: usize,
}

/// Counts and timings for one run of one source
#[derive(Debug, Clone)]
pub struct RunSummary {
    // Run metadata
    pub origin: String,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    // Harvest
    pub categories_attempted: usize,
    pub categories_complete: usize,
    pub categories_partial: usize,
    pub categories_failed: usize,
    pub pages_fetched: u64,
    pub items_skipped: usize,

    // Dedup
    pub raw_products: usize,
    pub unique_products: usize,
    pub duplicates_dropped: usize,
    pub name_duplicates_dropped: usize,

    // Delivery
    /// Batches handed to the endpoint, successful or not
    pub batches_sent: usize,
    pub batches_failed: usize,
    pub products_delivered: usize,

    pub category_failures: Vec<CategoryFailure>,
    pub batch_errors: Vec<(usize, String)>,
}

impl RunSummary {
    /// Starts a summary stamped with the current time
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            state: RunState::Discovering,
            started_at: Utc::now(),
            finished_at: None,
            categories_attempted: 0,
            categories_complete: 0,
            categories_partial: 0,
            categories_failed: 0,
            pages_fetched: 0,
            items_skipped: 0,
            raw_products: 0,
            unique_products: 0,
            duplicates_dropped: 0,
            name_duplicates_dropped: 0,
            batches_sent: 0,
            batches_failed: 0,
            products_delivered: 0,
            category_failures: Vec::new(),
            batch_errors: Vec::new(),
        }
    }

    /// Adds one finished category's counters
    ///
    /// Dedup counters are updated separately, as products reach the registry.
    pub fn record_category(&mut self, harvest: &CategoryHarvest) {
        self.categories_attempted += 1;
        self.pages_fetched += u64::from(harvest.pages_fetched);
        self.items_skipped += harvest.items_skipped;
        self.raw_products += harvest.products.len();

        match &harvest.outcome {
            CategoryOutcome::Complete => self.categories_complete += 1,
            CategoryOutcome::PartialFailure { .. } => self.categories_partial += 1,
            CategoryOutcome::TotalFailure { .. } => self.categories_failed += 1,
        }

        if !harvest.outcome.is_complete() {
            self.category_failures.push(CategoryFailure {
                category: harvest.category.name.clone(),
                outcome: harvest.outcome.clone(),
                products_kept: harvest.products.len(),
            });
        }
    }

    pub fn record_batches(&mut self, results: &[BatchResult]) {
        for result in results {
            self.batches_sent += 1;
            match &result.error {
                None => self.products_delivered += result.size,
                Some(error) => {
                    self.batches_failed += 1;
                    self.batch_errors.push((result.index, error.clone()));
                }
            }
        }
    }

    /// Stamps the finish time and final state
    pub fn finish(&mut self, state: RunState) {
        self.state = state;
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Returns true if any category or batch failed
    pub fn has_failures(&self) -> bool {
        self.categories_partial > 0 || self.categories_failed > 0 || self.batches_failed > 0
    }

    /// Share of unique products that reached the endpoint, as a percentage
    pub fn delivery_rate(&self) -> f64 {
        if self.unique_products == 0 {
            return 0.0;
        }
        (self.products_delivered as f64 / self.unique_products as f64) * 100.0
    }

    /// Share of raw products that were duplicates of an earlier one
    pub fn duplicate_rate(&self) -> f64 {
        if self.raw_products == 0 {
            return 0.0;
        }
        ((self.duplicates_dropped + self.name_duplicates_dropped) as f64
            / self.raw_products as f64)
            * 100.0
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Run Summary: {} ===\n", summary.origin);

    println!("Run:");
    println!("  State: {}", summary.state);
    println!("  Started: {}", summary.started_at.to_rfc3339());
    if let Some(finished) = summary.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = summary.duration_seconds() {
        println!("  Duration: {} seconds", duration);
    }
    println!();

    println!("Categories:");
    println!("  Attempted: {}", summary.categories_attempted);
    println!("  Complete: {}", summary.categories_complete);
    println!("  Partial failures: {}", summary.categories_partial);
    println!("  Total failures: {}", summary.categories_failed);
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!();

    println!("Products:");
    println!("  Harvested: {}", summary.raw_products);
    println!("  Unique: {}", summary.unique_products);
    println!("  Duplicates dropped: {}", summary.duplicates_dropped);
    if summary.name_duplicates_dropped > 0 {
        println!(
            "  Name duplicates dropped: {}",
            summary.name_duplicates_dropped
        );
    }
    println!("  Listings skipped: {}", summary.items_skipped);
    println!();

    println!("Delivery:");
    println!(
        "  Batches: {} sent, {} failed",
        summary.batches_sent, summary.batches_failed
    );
    println!(
        "  Delivered: {} / {} ({:.1}%)",
        summary.products_delivered,
        summary.unique_products,
        summary.delivery_rate()
    );

    if !summary.category_failures.is_empty() {
        println!();
        println!("Failed Categories ({}):", summary.category_failures.len());
        for failure in &summary.category_failures {
            println!("  - {}: {}", failure.category, failure.outcome);
        }
    }

    if !summary.batch_errors.is_empty() {
        println!();
        println!("Failed Batches ({}):", summary.batch_errors.len());
        for (index, error) in &summary.batch_errors {
            println!("  - #{}: {}", index + 1, error);
        }
    }
}

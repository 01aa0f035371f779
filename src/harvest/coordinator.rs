//! Pipeline coordinator - one end-to-end run for one source
//!
//! A run goes through:
//! - Category discovery (failure aborts the run)
//! - Harvesting with a bounded worker pool
//! - Deduplication as each category completes
//! - Batched delivery of the registry snapshot

use crate::config::{Config, SourceConfig};
use crate::harvest::filters::NameDedupFilter;
use crate::harvest::registry::DedupRegistry;
use crate::harvest::{FetchPolicy, Orchestrator};
use crate::model::Product;
use crate::output::RunSummary;
use crate::sink::{BatchSink, IngestEndpoint};
use crate::source::SourceAdapter;
use crate::state::RunState;
use crate::MinerError;
use std::sync::Arc;

const DEFAULT_CONCURRENCY: usize = 5;
const DEFAULT_BATCH_SIZE: usize = 1000;

/// Drives discovery, harvest, dedup, and delivery for a single source
///
/// A coordinator is consumed by `run`; each run gets a fresh registry.
pub struct Coordinator {
    source: Arc<dyn SourceAdapter>,
    sink: BatchSink,
    policy: FetchPolicy,
    concurrency: usize,
    batch_size: usize,
    dedup_by_name: bool,
    state: RunState,
}

impl Coordinator {
    /// Creates a coordinator with default policy, concurrency, and batch size
    pub fn new(source: Arc<dyn SourceAdapter>, endpoint: Arc<dyn IngestEndpoint>) -> Self {
        Self {
            source,
            sink: BatchSink::new(endpoint),
            policy: FetchPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            dedup_by_name: false,
            state: RunState::Discovering,
        }
    }

    /// Creates a coordinator using the settings of `source_config`
    ///
    /// # Arguments
    ///
    /// * `config` - The full configuration (harvest and sink sections)
    /// * `source_config` - The source being run
    /// * `source` - Adapter built for `source_config`
    /// * `endpoint` - Where batches are delivered
    pub fn from_config(
        config: &Config,
        source_config: &SourceConfig,
        source: Arc<dyn SourceAdapter>,
        endpoint: Arc<dyn IngestEndpoint>,
    ) -> Self {
        Self::new(source, endpoint)
            .with_policy(FetchPolicy::from_config(&config.harvest))
            .with_concurrency(source_config.effective_concurrency(&config.harvest))
            .with_batch_size(config.sink.batch_size)
            .with_name_dedup(source_config.dedup_by_name)
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enables the name-based post-filter for sources that list one item under several URLs
    pub fn with_name_dedup(mut self, enabled: bool) -> Self {
        self.dedup_by_name = enabled;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Moves the run to `to`, rejecting anything but the next forward step
    fn transition(&mut self, to: RunState) -> Result<(), MinerError> {
        if !self.state.can_transition_to(to) {
            return Err(MinerError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(
            "{}: {} -> {}",
            self.source.origin(),
            self.state,
            to
        );
        self.state = to;
        Ok(())
    }

    /// Runs the pipeline once
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run reached delivery; category and batch
    ///   failures are reported in the summary
    /// * `Err(MinerError::Discovery)` / `Err(MinerError::NoCategories)` -
    ///   discovery failed and nothing was harvested
    pub async fn run(mut self) -> Result<RunSummary, MinerError> {
        let origin = self.source.origin().to_string();
        let mut summary = RunSummary::new(origin.as_str());
        tracing::info!("Starting run for {}", origin);

        let categories = match self.source.discover_categories().await {
            Ok(categories) if !categories.is_empty() => categories,
            Ok(_) => {
                self.transition(RunState::Aborted)?;
                tracing::error!("{}: discovery returned no categories, aborting", origin);
                return Err(MinerError::NoCategories { origin });
            }
            Err(source) => {
                self.transition(RunState::Aborted)?;
                tracing::error!("{}: discovery failed, aborting: {}", origin, source);
                return Err(MinerError::Discovery { origin, source });
            }
        };
        tracing::info!("{}: discovered {} categories", origin, categories.len());

        self.transition(RunState::Harvesting)?;
        let registry = DedupRegistry::new();
        let mut name_filter = self.dedup_by_name.then(NameDedupFilter::new);
        let orchestrator = Orchestrator::new(
            self.source.clone(),
            self.policy.clone(),
            self.concurrency,
        );

        let mut harvests = orchestrator.spawn(categories);
        while let Some(harvest) = harvests.recv().await {
            summary.record_category(&harvest);
            absorb(
                harvest.products,
                &registry,
                name_filter.as_mut(),
                &mut summary,
            );
        }

        self.transition(RunState::Deduplicating)?;
        let snapshot = registry.snapshot();
        summary.unique_products = snapshot.len();
        tracing::info!(
            "{}: {} unique products from {} harvested ({} duplicates, {} name duplicates)",
            origin,
            summary.unique_products,
            summary.raw_products,
            summary.duplicates_dropped,
            summary.name_duplicates_dropped
        );

        self.transition(RunState::Delivering)?;
        let results = self.sink.deliver(&snapshot, self.batch_size).await;
        summary.record_batches(&results);

        self.transition(RunState::Done)?;
        summary.finish(RunState::Done);

        if summary.has_failures() {
            tracing::warn!(
                "{}: finished with {} failed categories, {} partial, {} failed batches",
                origin,
                summary.categories_failed,
                summary.categories_partial,
                summary.batches_failed
            );
        } else {
            tracing::info!(
                "{}: delivered {} products in {} batches",
                origin,
                summary.products_delivered,
                summary.batches_sent
            );
        }

        Ok(summary)
    }
}

/// Feeds one category's products into the registry, counting what was dropped
fn absorb(
    products: Vec<Product>,
    registry: &DedupRegistry,
    mut name_filter: Option<&mut NameDedupFilter>,
    summary: &mut RunSummary,
) {
    for product in products {
        if registry.contains(&product.id) {
            summary.duplicates_dropped += 1;
            continue;
        }
        if let Some(filter) = name_filter.as_deref_mut() {
            if !filter.accept(&product) {
                tracing::trace!("Dropping {} by name: {}", product.product_url, product.name);
                summary.name_duplicates_dropped += 1;
                continue;
            }
        }
        if !registry.insert(product) {
            summary.duplicates_dropped += 1;
        }
    }
}

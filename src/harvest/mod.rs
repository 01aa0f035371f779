//! Harvest core
//!
//! This module contains:
//! - `CategoryWorker`, the per-category pagination loop
//! - `Orchestrator`, the bounded worker pool
//! - `DedupRegistry`, the content-addressed first-writer-wins map
//! - `Coordinator`, which runs discovery through delivery for one source

mod coordinator;
mod filters;
mod orchestrator;
mod policy;
mod registry;
mod worker;

pub use coordinator::Coordinator;
pub use filters::NameDedupFilter;
pub use orchestrator::Orchestrator;
pub use policy::FetchPolicy;
pub use registry::DedupRegistry;
pub use worker::{CategoryHarvest, CategoryWorker};

//! Output module for run summaries and reports
//!
//! This module handles:
//! - Accumulating per-run counters and failures
//! - Printing a summary block to stdout
//! - Writing a markdown report covering every run

mod markdown;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use summary::{print_summary, CategoryFailure, RunSummary};

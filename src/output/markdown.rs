//! Markdown report generation
//!
//! Renders the summaries of every run in one invocation into a single
//! human-readable report.

use crate::output::summary::RunSummary;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report for `summaries` to `output_path`
///
/// # Arguments
///
/// * `summaries` - One summary per source run, in run order
/// * `config_hash` - Hash of the configuration used for the invocation
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(
    summaries: &[RunSummary],
    config_hash: &str,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_summary(summaries, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats run summaries as markdown
pub fn format_markdown_summary(summaries: &[RunSummary], config_hash: &str) -> String {
    let mut md = String::new();

    md.push_str("# Catalog Miner Run Report\n\n");
    md.push_str(&format!("- **Config Hash**: {}\n", config_hash));
    md.push_str(&format!("- **Sources**: {}\n\n", summaries.len()));

    // Overview table
    md.push_str("## Overview\n\n");
    md.push_str("| Source | State | Categories | Failed | Partial | Unique | Delivered | Failed Batches |\n");
    md.push_str("|--------|-------|------------|--------|---------|--------|-----------|----------------|\n");
    for s in summaries {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            s.origin,
            s.state,
            s.categories_attempted,
            s.categories_failed,
            s.categories_partial,
            s.unique_products,
            s.products_delivered,
            s.batches_failed
        ));
    }
    md.push('\n');

    for s in summaries {
        md.push_str(&format!("## {}\n\n", s.origin));
        md.push_str(&format!("- **Started**: {}\n", s.started_at.to_rfc3339()));
        if let Some(finished) = s.finished_at {
            md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
        }
        if let Some(duration) = s.duration_seconds() {
            md.push_str(&format!("- **Duration**: {} seconds\n", duration));
        }
        md.push_str(&format!("- **Pages Fetched**: {}\n", s.pages_fetched));
        md.push_str(&format!("- **Products Harvested**: {}\n", s.raw_products));
        md.push_str(&format!(
            "- **Duplicates Dropped**: {} ({:.2}%)\n",
            s.duplicates_dropped + s.name_duplicates_dropped,
            s.duplicate_rate()
        ));
        md.push_str(&format!("- **Listings Skipped**: {}\n", s.items_skipped));
        md.push_str(&format!(
            "- **Delivery Rate**: {:.2}%\n\n",
            s.delivery_rate()
        ));

        if !s.category_failures.is_empty() {
            md.push_str("### Failed Categories\n\n");
            md.push_str("| Category | Outcome | Products Kept |\n");
            md.push_str("|----------|---------|---------------|\n");
            for failure in &s.category_failures {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    failure.category, failure.outcome, failure.products_kept
                ));
            }
            md.push('\n');
        }

        if !s.batch_errors.is_empty() {
            md.push_str("### Failed Batches\n\n");
            for (index, error) in &s.batch_errors {
                md.push_str(&format!("- #{}: {}\n", index + 1, error));
            }
            md.push('\n');
        }
    }

    md
}

//! Timing policy injected into category workers

use crate::config::HarvestConfig;
use rand::Rng;
use std::time::Duration;

/// Jitter, timeouts, and pacing applied by a category worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Upper bound of the random delay before the first request
    pub max_jitter: Duration,

    /// Bound on a single page request, transfer included
    pub request_timeout: Duration,

    /// Delay between consecutive pages of one category
    pub page_delay: Duration,

    /// Stop a category after this many pages
    pub max_pages: Option<u32>,
}

impl FetchPolicy {
    /// Builds the policy from the `[harvest]` section
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            max_jitter: Duration::from_millis(config.max_jitter_ms),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            page_delay: Duration::from_millis(config.page_delay_ms),
            max_pages: config.max_pages,
        }
    }

    /// No jitter, no page delay, and a short request timeout
    ///
    /// Used by tests to keep runs deterministic.
    pub fn immediate() -> Self {
        Self {
            max_jitter: Duration::ZERO,
            request_timeout: Duration::from_secs(5),
            page_delay: Duration::ZERO,
            max_pages: None,
        }
    }

    /// Draws a delay uniformly from `[0, max_jitter]`
    pub fn sample_jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Returns true once `pages_fetched` reaches the configured cap
    pub fn reached_page_cap(&self, pages_fetched: u32) -> bool {
        self.max_pages.is_some_and(|cap| pages_fetched >= cap)
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_jitter: Duration::from_secs(5),
            request_timeout: Duration::from_secs(120),
            page_delay: Duration::ZERO,
            max_pages: None,
        }
    }
}

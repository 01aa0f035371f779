//! Scripted source and recording endpoint shared by unit tests

use crate::model::{Category, Product};
use crate::sink::IngestEndpoint;
use crate::source::{ParsedPage, RawPage, SourceAdapter};
use crate::{SinkError, SinkResult, SourceError, SourceResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What a scripted category returns for one page
#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Page body lines; a line starting with `!` is a malformed listing
    Items(Vec<&'static str>),
    /// Non-success HTTP status
    Status(u16),
    /// Never answers
    Hang,
    /// Panics inside the fetch
    Panic,
}

/// Source whose pages follow a per-category script
///
/// Pages past the end of a script are empty.
pub(crate) struct ScriptedSource {
    scripts: HashMap<String, Vec<Step>>,
    categories: Vec<Category>,
    latency: Duration,
    delays: HashMap<String, Duration>,
    discovery_status: Option<u16>,
    pub requests: Mutex<Vec<(String, u32)>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            categories: Vec::new(),
            latency: Duration::ZERO,
            delays: HashMap::new(),
            discovery_status: None,
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn category(mut self, slug: &str, steps: Vec<Step>) -> Self {
        self.categories.push(category(slug));
        self.scripts.insert(slug.to_string(), steps);
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Adds `delay` to every page fetch of one category
    pub fn delay(mut self, slug: &str, delay: Duration) -> Self {
        self.delays.insert(slug.to_string(), delay);
        self
    }

    /// Makes discovery fail with `status`
    pub fn failing_discovery(mut self, status: u16) -> Self {
        self.discovery_status = Some(status);
        self
    }

    pub fn categories(&self) -> Vec<Category> {
        self.categories.clone()
    }

    pub fn requests_for(&self, slug: &str) -> Vec<u32> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == slug)
            .map(|(_, page)| *page)
            .collect()
    }
}

pub(crate) fn category(slug: &str) -> Category {
    Category::new(
        slug.to_uppercase(),
        slug,
        format!("https://shop.example.com/{}?p={{page}}", slug),
    )
}

pub(crate) fn product_url(path: &str) -> String {
    format!("https://shop.example.com/p/{}", path)
}

#[async_trait]
impl SourceAdapter for ScriptedSource {
    fn origin(&self) -> &str {
        "Scripted"
    }

    async fn discover_categories(&self) -> SourceResult<Vec<Category>> {
        if let Some(status) = self.discovery_status {
            return Err(SourceError::Http {
                url: "https://shop.example.com/".to_string(),
                status,
            });
        }
        Ok(self.categories.clone())
    }

    async fn fetch_page(&self, category: &Category, page: u32) -> SourceResult<RawPage> {
        self.requests
            .lock()
            .unwrap()
            .push((category.slug.clone(), page));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self.latency + self.delays.get(&category.slug).copied().unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let url = category.page_url(page);
        let step = self
            .scripts
            .get(&category.slug)
            .and_then(|steps| steps.get(page as usize - 1))
            .cloned()
            .unwrap_or(Step::Items(vec![]));

        match step {
            Step::Items(lines) => Ok(RawPage {
                url,
                page,
                body: lines.join("\n"),
            }),
            Step::Status(status) => Err(SourceError::Http { url, status }),
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(SourceError::Timeout { url })
            }
            Step::Panic => panic!("scripted panic on {}", url),
        }
    }

    fn parse_page(&self, category: &Category, page: &RawPage) -> ParsedPage {
        let mut parsed = ParsedPage::default();
        for line in page.body.lines().filter(|l| !l.is_empty()) {
            if line.starts_with('!') {
                parsed.skipped += 1;
                continue;
            }
            parsed.products.push(Product::new(
                self.origin(),
                line,
                100,
                false,
                "",
                &product_url(line),
                category.name.as_str(),
            ));
        }
        parsed
    }
}

/// Endpoint that records every batch and rejects the calls listed in `fail_calls`
#[derive(Default)]
pub(crate) struct RecordingEndpoint {
    pub batches: Mutex<Vec<Vec<Product>>>,
    fail_calls: Vec<usize>,
}

impl RecordingEndpoint {
    pub fn failing_on(fail_calls: Vec<usize>) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            fail_calls,
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl IngestEndpoint for RecordingEndpoint {
    async fn submit(&self, products: &[Product]) -> SinkResult<()> {
        let mut batches = self.batches.lock().unwrap();
        let call = batches.len();
        batches.push(products.to_vec());
        if self.fail_calls.contains(&call) {
            return Err(SinkError::Rejected { status: 500 });
        }
        Ok(())
    }
}

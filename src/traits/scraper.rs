//! Scrape-provider seam.
//!
//! The pipeline talks to its web-scraping backend through
//! [`ScrapeProvider`], which covers the three call shapes the pipeline
//! needs: single-page scrape, site-map search, and batch scrape.
//! Implementations wrap a concrete service (see
//! [`FirecrawlScraper`](crate::providers::FirecrawlScraper)) or a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::FetchResult;

/// A scraped page: markdown plus whatever metadata the provider returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub markdown: String,
    #[serde(default)]
    pub metadata: PageMetadata,
    /// Links the provider found on the page, when it reports them
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub branding: Option<Branding>,
}

/// Page metadata (title/description) from the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Provider-detected branding assets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Branding {
    #[serde(default)]
    pub logos: Vec<String>,
}

/// One document out of a batch scrape.
///
/// Absent markdown is carried through as `None` and skipped at the
/// extraction stage; it never fails the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDocument {
    pub url: String,
    pub markdown: Option<String>,
}

impl BatchDocument {
    /// Create a batch document.
    pub fn new(url: impl Into<String>, markdown: Option<String>) -> Self {
        Self {
            url: url.into(),
            markdown,
        }
    }
}

/// Formatting options for a single-page scrape.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Extract only the main content region
    pub only_main_content: bool,

    /// HTML tags to strip before markdown conversion
    pub exclude_tags: Vec<String>,

    /// Drop inline base64 images from the markdown
    pub remove_base64_images: bool,

    /// Provider-side timeout for this scrape
    pub timeout: Duration,
}

impl ScrapeOptions {
    /// Options for the initial careers-page overview fetch.
    ///
    /// Keeps the full page so link discovery can see navigation and
    /// listing sections.
    pub fn overview() -> Self {
        Self {
            only_main_content: false,
            exclude_tags: Vec::new(),
            remove_base64_images: false,
            timeout: Duration::from_secs(120),
        }
    }

    /// Options for per-job detail fetches: main content only, chrome
    /// stripped, images dropped.
    pub fn job_detail() -> Self {
        Self {
            only_main_content: true,
            exclude_tags: vec![
                "nav".to_string(),
                "header".to_string(),
                "footer".to_string(),
            ],
            remove_base64_images: true,
            timeout: Duration::from_secs(120),
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Web-scraping backend used by the pipeline.
#[async_trait]
pub trait ScrapeProvider: Send + Sync {
    /// Scrape one URL into markdown and metadata.
    ///
    /// Idempotent from the caller's perspective; the same URL may be
    /// scraped for the overview and again for job detail with different
    /// options.
    async fn scrape(&self, url: &str, options: &ScrapeOptions) -> FetchResult<ScrapedPage>;

    /// Query the provider's site map with a search heuristic.
    ///
    /// Returns up to `limit` URLs the provider considers relevant to
    /// `search` under `url`.
    async fn map(&self, url: &str, search: &str, limit: usize) -> FetchResult<Vec<String>>;

    /// Fetch many URLs in one batched request.
    ///
    /// Individual documents may come back without markdown; only a
    /// transport-level failure of the whole batch is an error.
    async fn batch_scrape(&self, urls: &[String]) -> FetchResult<Vec<BatchDocument>>;

    /// Provider name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

//! Mock implementations for testing.
//!
//! Deterministic, scriptable stand-ins for the scrape provider and the
//! structured model, with call recording for assertions. No network.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use crate::error::{FetchError, FetchResult, ModelError, ModelResult};
use crate::traits::model::StructuredModel;
use crate::traits::scraper::{
    BatchDocument, PageMetadata, ScrapeOptions, ScrapeProvider, ScrapedPage,
};

/// Record of a call made to [`MockScraper`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScraperCall {
    Scrape { url: String },
    Map { url: String, search: String },
    Batch { urls: Vec<String> },
}

/// A scriptable [`ScrapeProvider`].
///
/// Unscripted URLs and searches fail with a provider error, which in
/// best-effort code paths exercises the swallow-and-warn branch.
#[derive(Default)]
pub struct MockScraper {
    pages: RwLock<HashMap<String, ScrapedPage>>,
    map_results: RwLock<HashMap<String, Vec<String>>>,
    batch_fails: bool,
    calls: RwLock<Vec<ScraperCall>>,
}

impl MockScraper {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a page with markdown only.
    pub fn with_page(self, url: impl Into<String>, markdown: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(
            url.into(),
            ScrapedPage {
                markdown: markdown.into(),
                ..Default::default()
            },
        );
        self
    }

    /// Script a page with markdown and a metadata title.
    pub fn with_page_title(
        self,
        url: impl Into<String>,
        markdown: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        self.pages.write().unwrap().insert(
            url.into(),
            ScrapedPage {
                markdown: markdown.into(),
                metadata: PageMetadata {
                    title: Some(title.into()),
                    description: None,
                },
                ..Default::default()
            },
        );
        self
    }

    /// Script a full page (for branding/links scenarios).
    pub fn with_scraped_page(self, url: impl Into<String>, page: ScrapedPage) -> Self {
        self.pages.write().unwrap().insert(url.into(), page);
        self
    }

    /// Script a site-map result, keyed by search string.
    pub fn with_map_result(self, search: impl Into<String>, urls: Vec<String>) -> Self {
        self.map_results.write().unwrap().insert(search.into(), urls);
        self
    }

    /// Make `batch_scrape` fail at the transport level.
    pub fn with_batch_failure(mut self) -> Self {
        self.batch_fails = true;
        self
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<ScraperCall> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, call: ScraperCall) {
        self.calls.write().unwrap().push(call);
    }
}

#[async_trait]
impl ScrapeProvider for MockScraper {
    async fn scrape(&self, url: &str, _options: &ScrapeOptions) -> FetchResult<ScrapedPage> {
        self.record(ScraperCall::Scrape {
            url: url.to_string(),
        });
        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Provider(format!("no scripted page for {}", url)))
    }

    async fn map(&self, url: &str, search: &str, _limit: usize) -> FetchResult<Vec<String>> {
        self.record(ScraperCall::Map {
            url: url.to_string(),
            search: search.to_string(),
        });
        self.map_results
            .read()
            .unwrap()
            .get(search)
            .cloned()
            .ok_or_else(|| FetchError::Provider(format!("no scripted map for '{}'", search)))
    }

    async fn batch_scrape(&self, urls: &[String]) -> FetchResult<Vec<BatchDocument>> {
        self.record(ScraperCall::Batch {
            urls: urls.to_vec(),
        });
        if self.batch_fails {
            return Err(FetchError::Provider("batch transport failure".to_string()));
        }
        let pages = self.pages.read().unwrap();
        Ok(urls
            .iter()
            .map(|url| {
                let markdown = pages
                    .get(url)
                    .map(|p| p.markdown.clone())
                    .filter(|m| !m.trim().is_empty());
                BatchDocument::new(url.clone(), markdown)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A scriptable [`StructuredModel`].
///
/// Responses are served from per-URL queues first (matched by the URL
/// appearing in the prompt), then from a global FIFO. With nothing
/// scripted the model answers `{}`, which validates to an empty posting.
#[derive(Default)]
pub struct MockModel {
    responses: RwLock<VecDeque<serde_json::Value>>,
    url_responses: RwLock<Vec<(String, VecDeque<serde_json::Value>)>>,
    fail_all: bool,
    prompts: RwLock<Vec<String>>,
}

impl MockModel {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response on the global FIFO.
    pub fn with_response(self, value: serde_json::Value) -> Self {
        self.responses.write().unwrap().push_back(value);
        self
    }

    /// Queue a response for prompts mentioning `url`.
    pub fn with_job_response(self, url: impl Into<String>, value: serde_json::Value) -> Self {
        let url = url.into();
        let mut keyed = self.url_responses.write().unwrap();
        if let Some((_, queue)) = keyed.iter_mut().find(|(k, _)| *k == url) {
            queue.push_back(value);
        } else {
            keyed.push((url, VecDeque::from([value])));
        }
        drop(keyed);
        self
    }

    /// Make every call fail with a transport-style error.
    pub fn with_failures(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Number of calls made.
    pub fn call_count(&self) -> usize {
        self.prompts.read().unwrap().len()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

#[async_trait]
impl StructuredModel for MockModel {
    async fn generate_structured(
        &self,
        prompt: &str,
        _schema: &serde_json::Value,
    ) -> ModelResult<serde_json::Value> {
        self.prompts.write().unwrap().push(prompt.to_string());

        if self.fail_all {
            return Err(ModelError::Status {
                status: 500,
                body: "scripted failure".to_string(),
            });
        }

        {
            let mut keyed = self.url_responses.write().unwrap();
            if let Some((_, queue)) = keyed
                .iter_mut()
                .find(|(url, queue)| prompt.contains(url.as_str()) && !queue.is_empty())
            {
                if let Some(value) = queue.pop_front() {
                    return Ok(value);
                }
            }
        }

        if let Some(value) = self.responses.write().unwrap().pop_front() {
            return Ok(value);
        }

        Ok(serde_json::json!({}))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scraper_records_calls() {
        let scraper = MockScraper::new().with_page("https://acme.com", "content");
        scraper
            .scrape("https://acme.com", &ScrapeOptions::overview())
            .await
            .unwrap();
        let _ = scraper.map("https://acme.com", "jobs", 5).await;

        let calls = scraper.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], ScraperCall::Scrape { url } if url == "https://acme.com"));
    }

    #[tokio::test]
    async fn test_model_url_routing_beats_fifo() {
        let model = MockModel::new()
            .with_response(serde_json::json!({"fifo": true}))
            .with_job_response("https://acme.com/jobs/swe", serde_json::json!({"keyed": true}));

        let keyed = model
            .generate_structured("Source URL: https://acme.com/jobs/swe", &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(keyed["keyed"], true);

        let fifo = model
            .generate_structured("unrelated prompt", &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(fifo["fifo"], true);
    }

    #[tokio::test]
    async fn test_model_defaults_to_empty_object() {
        let model = MockModel::new();
        let value = model
            .generate_structured("anything", &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}

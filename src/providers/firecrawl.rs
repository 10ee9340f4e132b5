//! Firecrawl-backed scrape provider.
//!
//! Talks to the Firecrawl v1 API: single-page `/scrape`, site-map `/map`
//! search, and `/batch/scrape` with status polling for the per-job
//! detail fetches.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::credentials::SecretString;
use crate::error::{FetchError, FetchResult};
use crate::traits::scraper::{
    BatchDocument, Branding, PageMetadata, ScrapeOptions, ScrapeProvider, ScrapedPage,
};

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";

/// Firecrawl-based [`ScrapeProvider`].
///
/// Firecrawl renders JavaScript-heavy job boards and converts them to
/// markdown, which is what makes AI link discovery workable across
/// inconsistent careers-page markup.
///
/// # Example
///
/// ```rust,ignore
/// let provider = FirecrawlScraper::from_env()?;
/// let page = provider.scrape("https://acme.com/careers", &ScrapeOptions::overview()).await?;
/// ```
pub struct FirecrawlScraper {
    client: Client,
    api_key: SecretString,
    base_url: String,
    /// Timeout for polling batch status (seconds)
    poll_timeout_secs: u64,
    /// Interval between poll attempts (seconds)
    poll_interval_secs: u64,
}

// Request/response types for the Firecrawl API

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: Vec<&'static str>,
    #[serde(rename = "onlyMainContent")]
    only_main_content: bool,
    #[serde(rename = "excludeTags", skip_serializing_if = "Vec::is_empty")]
    exclude_tags: Vec<String>,
    #[serde(rename = "removeBase64Images")]
    remove_base64_images: bool,
    /// Milliseconds
    timeout: u64,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    metadata: Option<ScrapeMetadata>,
    #[serde(default)]
    links: Vec<String>,
    branding: Option<BrandingData>,
}

#[derive(Deserialize)]
struct ScrapeMetadata {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "sourceURL")]
    source_url: Option<String>,
}

#[derive(Deserialize)]
struct BrandingData {
    #[serde(default)]
    logos: Vec<String>,
}

#[derive(Serialize)]
struct MapRequest<'a> {
    url: &'a str,
    search: &'a str,
    limit: usize,
}

#[derive(Deserialize)]
struct MapResponse {
    success: bool,
    /// Newer API versions use `links`, older ones `data`
    links: Option<Vec<String>>,
    data: Option<Vec<String>>,
    error: Option<String>,
}

#[derive(Serialize)]
struct BatchScrapeRequest<'a> {
    urls: &'a [String],
    #[serde(rename = "scrapeOptions")]
    scrape_options: BatchScrapeOptions,
}

#[derive(Serialize)]
struct BatchScrapeOptions {
    formats: Vec<&'static str>,
    #[serde(rename = "onlyMainContent")]
    only_main_content: bool,
    #[serde(rename = "removeBase64Images")]
    remove_base64_images: bool,
}

#[derive(Deserialize)]
struct BatchStartResponse {
    success: bool,
    id: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct BatchStatusResponse {
    status: String,
    data: Option<Vec<BatchPageData>>,
}

#[derive(Deserialize)]
struct BatchPageData {
    markdown: Option<String>,
    metadata: Option<ScrapeMetadata>,
}

impl FirecrawlScraper {
    /// Create a new provider with the given API key.
    pub fn new(api_key: impl Into<SecretString>) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: FIRECRAWL_API_URL.to_string(),
            poll_timeout_secs: 300,
            poll_interval_secs: 3,
        })
    }

    /// Create from environment variable `FIRECRAWL_API_KEY`.
    pub fn from_env() -> FetchResult<Self> {
        let api_key = std::env::var("FIRECRAWL_API_KEY")
            .map_err(|_| FetchError::Provider("FIRECRAWL_API_KEY not set".to_string()))?;
        Self::new(api_key)
    }

    /// Set a custom API base URL (for proxies or tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the batch poll timeout (seconds).
    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    /// Set the batch poll interval (seconds).
    pub fn with_poll_interval(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    async fn post<T: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> FetchResult<R> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.clone(),
                    }
                } else {
                    FetchError::Http(Box::new(e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))
    }

    async fn get<R: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> FetchResult<R> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose())
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))
    }

    fn batch_page_to_document(data: BatchPageData) -> Option<BatchDocument> {
        let url = data.metadata.as_ref().and_then(|m| m.source_url.clone())?;
        let markdown = data.markdown.filter(|m| !m.trim().is_empty());
        Some(BatchDocument::new(url, markdown))
    }
}

#[async_trait]
impl ScrapeProvider for FirecrawlScraper {
    async fn scrape(&self, url: &str, options: &ScrapeOptions) -> FetchResult<ScrapedPage> {
        let request = ScrapeRequest {
            url,
            formats: vec!["markdown"],
            only_main_content: options.only_main_content,
            exclude_tags: options.exclude_tags.clone(),
            remove_base64_images: options.remove_base64_images,
            timeout: options.timeout.as_millis() as u64,
        };

        let response: ScrapeResponse = self.post("/scrape", &request).await?;

        if !response.success {
            return Err(FetchError::Provider(
                response
                    .error
                    .unwrap_or_else(|| "Firecrawl scrape failed".to_string()),
            ));
        }

        let data = response
            .data
            .ok_or_else(|| FetchError::Provider("no data returned from Firecrawl".to_string()))?;

        let markdown = data.markdown.unwrap_or_default();
        let metadata = data
            .metadata
            .map(|m| PageMetadata {
                title: m.title,
                description: m.description,
            })
            .unwrap_or_default();

        Ok(ScrapedPage {
            markdown,
            metadata,
            links: data.links,
            branding: data.branding.map(|b| Branding { logos: b.logos }),
        })
    }

    async fn map(&self, url: &str, search: &str, limit: usize) -> FetchResult<Vec<String>> {
        let request = MapRequest { url, search, limit };
        let response: MapResponse = self.post("/map", &request).await?;

        if !response.success {
            return Err(FetchError::Provider(
                response
                    .error
                    .unwrap_or_else(|| "Firecrawl map failed".to_string()),
            ));
        }

        Ok(response.links.or(response.data).unwrap_or_default())
    }

    async fn batch_scrape(&self, urls: &[String]) -> FetchResult<Vec<BatchDocument>> {
        let request = BatchScrapeRequest {
            urls,
            scrape_options: BatchScrapeOptions {
                formats: vec!["markdown"],
                only_main_content: true,
                remove_base64_images: true,
            },
        };

        let start: BatchStartResponse = self.post("/batch/scrape", &request).await?;

        if !start.success {
            return Err(FetchError::Provider(
                start
                    .error
                    .unwrap_or_else(|| "failed to start batch scrape".to_string()),
            ));
        }

        let batch_id = start
            .id
            .ok_or_else(|| FetchError::Provider("no batch id returned".to_string()))?;

        tracing::info!(batch_id = %batch_id, urls = urls.len(), "batch scrape started, polling");

        let max_attempts = self.poll_timeout_secs / self.poll_interval_secs.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            if attempts > max_attempts {
                return Err(FetchError::Timeout {
                    url: format!("{}/batch/scrape/{}", self.base_url, batch_id),
                });
            }

            tokio::time::sleep(Duration::from_secs(self.poll_interval_secs)).await;

            let status: BatchStatusResponse =
                self.get(&format!("/batch/scrape/{}", batch_id)).await?;

            match status.status.as_str() {
                "completed" => {
                    let documents: Vec<BatchDocument> = status
                        .data
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(Self::batch_page_to_document)
                        .collect();

                    tracing::info!(
                        batch_id = %batch_id,
                        documents = documents.len(),
                        "batch scrape completed"
                    );

                    return Ok(documents);
                }
                "failed" => {
                    return Err(FetchError::Provider("batch scrape failed".to_string()));
                }
                _ => {
                    if attempts % 10 == 0 {
                        tracing::debug!(batch_id = %batch_id, status = %status.status, "batch in progress");
                    }
                }
            }
        }
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider() {
        let provider = FirecrawlScraper::new("test-key").unwrap();
        assert_eq!(provider.name(), "firecrawl");
    }

    #[test]
    fn test_batch_page_to_document() {
        let data = BatchPageData {
            markdown: Some("# Software Engineer\n\nRemote role".to_string()),
            metadata: Some(ScrapeMetadata {
                title: Some("Software Engineer".to_string()),
                description: None,
                source_url: Some("https://acme.com/jobs/swe".to_string()),
            }),
        };

        let doc = FirecrawlScraper::batch_page_to_document(data).unwrap();
        assert_eq!(doc.url, "https://acme.com/jobs/swe");
        assert!(doc.markdown.unwrap().contains("Software Engineer"));
    }

    #[test]
    fn test_batch_page_empty_markdown_carried_as_none() {
        let data = BatchPageData {
            markdown: Some("   ".to_string()),
            metadata: Some(ScrapeMetadata {
                title: None,
                description: None,
                source_url: Some("https://acme.com/jobs/empty".to_string()),
            }),
        };

        let doc = FirecrawlScraper::batch_page_to_document(data).unwrap();
        assert!(doc.markdown.is_none());
    }

    #[test]
    fn test_batch_page_without_url_dropped() {
        let data = BatchPageData {
            markdown: Some("content".to_string()),
            metadata: None,
        };

        assert!(FirecrawlScraper::batch_page_to_document(data).is_none());
    }
}

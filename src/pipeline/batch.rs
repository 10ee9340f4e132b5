//! Batch document fetching with partial-failure tolerance.

use futures::future::join_all;

use crate::error::FetchResult;
use crate::traits::scraper::{BatchDocument, ScrapeOptions, ScrapeProvider};

/// Fetch all candidate URLs in one batched request.
///
/// The result is aligned to the input order, one document per requested
/// URL. A URL the provider returned nothing for yields a document with
/// `markdown: None` rather than an error; only a transport failure of
/// the whole batch propagates.
pub async fn fetch_documents<P: ScrapeProvider + ?Sized>(
    provider: &P,
    urls: &[String],
) -> FetchResult<Vec<BatchDocument>> {
    let fetched = provider.batch_scrape(urls).await?;

    let documents = urls
        .iter()
        .map(|url| {
            let markdown = fetched
                .iter()
                .find(|d| &d.url == url)
                .and_then(|d| d.markdown.clone());
            BatchDocument::new(url.clone(), markdown)
        })
        .collect();

    Ok(documents)
}

/// Best-effort page-title previews for the live step details.
///
/// Runs one lightweight scrape per URL concurrently; any failure is
/// swallowed with a warning and yields `None`. Purely cosmetic; never
/// affects pipeline correctness.
pub async fn try_fetch_titles<P: ScrapeProvider + ?Sized>(
    provider: &P,
    urls: &[String],
) -> Vec<Option<String>> {
    let options = ScrapeOptions::job_detail();
    join_all(urls.iter().map(|url| {
        let options = &options;
        async move {
            match provider.scrape(url, options).await {
                Ok(page) => page.metadata.title,
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "title preview failed");
                    None
                }
            }
        }
    }))
    .await
}

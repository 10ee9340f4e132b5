//! Page fetching: URL normalization and the minimum-content guard.

use crate::error::{FetchError, FetchResult};
use crate::traits::scraper::{ScrapeOptions, ScrapeProvider, ScrapedPage};

/// Normalize a user-supplied URL: prefix `https://` when no scheme is
/// given, then validate the result parses.
pub fn normalize_url(input: &str) -> FetchResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidUrl {
            url: input.to_string(),
        });
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = url::Url::parse(&candidate).map_err(|_| FetchError::InvalidUrl {
        url: input.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(FetchError::InvalidUrl {
            url: input.to_string(),
        });
    }

    Ok(candidate)
}

/// The scheme+host origin of a URL, for the root-domain recovery search.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(format!("{}://{}", parsed.scheme(), host))
}

/// Fetch a page and reject near-empty content.
///
/// A page whose trimmed markdown is shorter than `min_content_len` is
/// not a valid postable page; treating it as success would send garbage
/// into discovery.
pub async fn fetch_page<P: ScrapeProvider + ?Sized>(
    provider: &P,
    url: &str,
    options: &ScrapeOptions,
    min_content_len: usize,
) -> FetchResult<ScrapedPage> {
    let page = provider.scrape(url, options).await?;

    let len = page.markdown.trim().len();
    if len < min_content_len {
        return Err(FetchError::ContentTooShort {
            url: url.to_string(),
            len,
        });
    }

    tracing::debug!(url = %url, chars = len, "fetched page");
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockScraper;

    #[test]
    fn test_normalize_adds_https() {
        assert_eq!(
            normalize_url("x.ai/careers/open-roles").unwrap(),
            "https://x.ai/careers/open-roles"
        );
    }

    #[test]
    fn test_normalize_keeps_existing_scheme() {
        assert_eq!(
            normalize_url("http://acme.com/jobs").unwrap(),
            "http://acme.com/jobs"
        );
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize_url("   ").is_err());
    }

    #[test]
    fn test_normalize_rejects_non_http_scheme() {
        assert!(normalize_url("ftp://acme.com/jobs").is_err());
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://acme.com/careers/open-roles").as_deref(),
            Some("https://acme.com")
        );
    }

    #[tokio::test]
    async fn test_short_content_rejected() {
        let provider =
            MockScraper::new().with_page("https://acme.com/careers", "too short page");

        let err = fetch_page(
            &provider,
            "https://acme.com/careers",
            &ScrapeOptions::overview(),
            50,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FetchError::ContentTooShort { len: 14, .. }));
    }

    #[tokio::test]
    async fn test_long_content_accepted() {
        let markdown = "# Careers at Acme\n\nWe are hiring engineers across many teams.";
        let provider = MockScraper::new().with_page("https://acme.com/careers", markdown);

        let page = fetch_page(
            &provider,
            "https://acme.com/careers",
            &ScrapeOptions::overview(),
            50,
        )
        .await
        .unwrap();

        assert_eq!(page.markdown, markdown);
    }
}

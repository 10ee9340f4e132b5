//! Link discovery: AI-assisted candidate extraction with a site-map
//! augmentation pass and a root-domain recovery search.
//!
//! Job boards use wildly inconsistent markup, so candidate links come
//! from the model reading the page markdown rather than from regexes.
//! The site-map pass is best-effort: its failure is logged and ignored.

use indexmap::IndexSet;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::fetch::origin_of;
use crate::traits::{model::StructuredModel, scraper::ScrapeProvider};

/// Shape the model is constrained to for link discovery.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiscoveredLinks {
    /// Absolute URLs of individual job postings found in the page
    pub links: Vec<String>,
}

/// JSON Schema for [`DiscoveredLinks`].
pub fn discovered_links_schema() -> serde_json::Value {
    serde_json::to_value(schema_for!(DiscoveredLinks)).unwrap_or_else(|_| serde_json::json!({}))
}

fn link_prompt(markdown: &str, base_url: &str) -> String {
    format!(
        "The following markdown is a careers or job-listing page from {base}.\n\
         Find every link that points to an INDIVIDUAL job posting (not category \
         pages, not the listing page itself, not external social links).\n\
         Return absolute URLs; resolve relative links against {base}.\n\n\
         PAGE MARKDOWN:\n{markdown}",
        base = base_url,
        markdown = markdown,
    )
}

/// Discover candidate job-posting URLs from the overview page.
///
/// Candidates are deduplicated by exact string equality in insertion
/// order (no URL normalization before dedup; trailing-slash near-misses
/// are accepted as distinct). Site-map candidates equal to or no longer
/// than the base URL are dropped: the listing page itself is not a leaf
/// job page.
pub async fn discover_links<M, P>(
    model: &M,
    provider: &P,
    markdown: &str,
    base_url: &str,
    map_search: &str,
) -> Result<Vec<String>>
where
    M: StructuredModel + ?Sized,
    P: ScrapeProvider + ?Sized,
{
    let schema = discovered_links_schema();
    let value = model
        .generate_structured(&link_prompt(markdown, base_url), &schema)
        .await?;

    let mut candidates: IndexSet<String> = match serde_json::from_value::<DiscoveredLinks>(value) {
        Ok(found) => found.links.into_iter().collect(),
        Err(e) => {
            // Discovery parse failure is not fatal; the map pass below
            // may still find candidates.
            tracing::warn!(error = %e, "model returned unparseable link list");
            IndexSet::new()
        }
    };

    for url in try_map_augment(provider, base_url, map_search).await {
        if url != base_url && url.len() > base_url.len() {
            candidates.insert(url);
        }
    }

    tracing::info!(base_url = %base_url, candidates = candidates.len(), "link discovery finished");
    Ok(candidates.into_iter().collect())
}

/// Best-effort site-map augmentation; failures are warned and swallowed.
async fn try_map_augment<P: ScrapeProvider + ?Sized>(
    provider: &P,
    base_url: &str,
    search: &str,
) -> Vec<String> {
    match provider.map(base_url, search, 100).await {
        Ok(urls) => urls,
        Err(e) => {
            tracing::warn!(base_url = %base_url, error = %e, "site-map augmentation failed");
            Vec::new()
        }
    }
}

/// Root-domain recovery: search the origin's site map for a careers
/// page and return the most plausible candidate.
///
/// Prefers the first URL whose path contains `/careers` or `/jobs`,
/// falling back to the first result. Returns `None` when the search
/// fails or comes back empty; the caller then reports `NoLinksFound`.
pub async fn find_recovery_candidate<P: ScrapeProvider + ?Sized>(
    provider: &P,
    base_url: &str,
    search: &str,
    limit: usize,
) -> Option<String> {
    let origin = origin_of(base_url)?;

    let results = match provider.map(&origin, search, limit).await {
        Ok(urls) => urls,
        Err(e) => {
            tracing::warn!(origin = %origin, error = %e, "recovery search failed");
            return None;
        }
    };

    results
        .iter()
        .find(|u| {
            url::Url::parse(u)
                .ok()
                .map(|p| {
                    let path = p.path();
                    path.contains("/careers") || path.contains("/jobs")
                })
                .unwrap_or(false)
        })
        .or_else(|| results.first())
        .cloned()
}

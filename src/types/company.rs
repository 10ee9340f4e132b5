//! Company metadata derived from the overview page.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::traits::scraper::ScrapedPage;

/// Company row upserted alongside job postings, unique on `name`.
///
/// Derived heuristically from the overview page: the name is the page
/// title up to the first separator, the website is the scraped origin,
/// and the logo comes from provider branding data when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    pub website: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl CompanyInfo {
    /// Create company info with a name and website.
    pub fn new(name: impl Into<String>, website: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            website: website.into(),
            logo_url: None,
        }
    }

    /// Set the logo URL.
    pub fn with_logo_url(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }

    /// Derive company info from an overview page.
    ///
    /// Returns `None` when neither the page title nor the URL host give
    /// a usable name.
    pub fn from_page(page: &ScrapedPage, base_url: &str) -> Option<Self> {
        let name = page
            .metadata
            .title
            .as_deref()
            .and_then(name_from_title)
            .or_else(|| host_from_url(base_url))?;

        let website = url::Url::parse(base_url)
            .ok()
            .map(|u| format!("{}://{}", u.scheme(), u.host_str().unwrap_or("")))
            .unwrap_or_else(|| base_url.to_string());

        let logo_url = page
            .branding
            .as_ref()
            .and_then(|b| b.logos.first().cloned());

        Some(Self {
            name,
            website,
            logo_url,
        })
    }
}

/// Take the part of a page title before the first separator.
///
/// "Careers | Acme Corp" and "Acme Corp - Open Roles" both yield the
/// segment on their respective sides; we take the first segment, which
/// careers pages almost always lead with.
fn name_from_title(title: &str) -> Option<String> {
    let first = title
        .split(['|', '-', '–'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    Some(first.to_string())
}

fn host_from_url(base_url: &str) -> Option<String> {
    url::Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .filter(|h| !h.is_empty())
}

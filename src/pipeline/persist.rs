//! Persistence: company-then-jobs upserts keyed by natural unique keys.

use crate::error::PersistResult;
use crate::traits::store::JobStore;
use crate::types::{company::CompanyInfo, job::JobPosting};

/// Outcome of a persistence pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOutcome {
    /// Job rows written
    pub saved: u64,
}

/// Upsert the company (when given) and the job batch.
///
/// Jobs are keyed by `url`, so re-scraping the same posting updates
/// rather than duplicates it. With `replace` set, the company's
/// existing jobs are removed first, making its job list idempotent per
/// scrape run instead of additive. A store error propagates without
/// touching the in-memory postings.
pub async fn persist_jobs<S: JobStore + ?Sized>(
    store: &S,
    jobs: &[JobPosting],
    company: Option<&CompanyInfo>,
    replace: bool,
) -> PersistResult<PersistOutcome> {
    let company_id = match company {
        Some(info) => Some(store.upsert_company(info).await?),
        None => None,
    };

    let saved = match (company_id, replace) {
        (Some(id), true) => store.replace_company_jobs(id, jobs).await?,
        _ => store.upsert_jobs(jobs, company_id).await?,
    };

    tracing::info!(saved, replace, "persisted job batch");
    Ok(PersistOutcome { saved })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::types::job::JobPosting;

    fn job(url: &str, title: &str) -> JobPosting {
        JobPosting::new(url).with_title(title)
    }

    #[tokio::test]
    async fn test_upsert_links_company() {
        let store = MemoryStore::new();
        let company = CompanyInfo::new("Acme", "https://acme.com");
        let jobs = vec![job("https://acme.com/jobs/swe", "SWE")];

        let outcome = persist_jobs(&store, &jobs, Some(&company), false)
            .await
            .unwrap();

        assert_eq!(outcome.saved, 1);
        assert_eq!(store.company_count(), 1);
        assert_eq!(store.job_count(), 1);
    }

    #[tokio::test]
    async fn test_rescrape_same_url_is_idempotent() {
        // Scraping the same URL twice updates the existing row
        let store = MemoryStore::new();
        let jobs = vec![job("https://acme.com/jobs/swe", "SWE")];

        persist_jobs(&store, &jobs, None, false).await.unwrap();
        persist_jobs(&store, &jobs, None, false).await.unwrap();

        assert_eq!(store.job_count(), 1);
    }

    #[tokio::test]
    async fn test_replace_mode_drops_stale_jobs() {
        // A second scrape with replace leaves only its own jobs
        let store = MemoryStore::new();
        let company = CompanyInfo::new("Acme", "https://acme.com");

        let first = vec![
            job("https://acme.com/jobs/swe", "SWE"),
            job("https://acme.com/jobs/pm", "PM"),
        ];
        persist_jobs(&store, &first, Some(&company), true)
            .await
            .unwrap();

        let second = vec![job("https://acme.com/jobs/designer", "Designer")];
        persist_jobs(&store, &second, Some(&company), true)
            .await
            .unwrap();

        assert_eq!(store.job_count(), 1);
    }
}

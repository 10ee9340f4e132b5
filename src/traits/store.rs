//! Relational-store seam.
//!
//! Jobs are unique on `url`, companies on `name`; both writes are
//! conflict-aware upserts, so concurrent scrapes of overlapping content
//! are safe without explicit locking (last-writer-wins).

use async_trait::async_trait;

use crate::error::PersistResult;
use crate::types::{company::CompanyInfo, job::JobPosting};

/// Opaque company row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompanyId(pub i64);

/// Backing store for extracted jobs and companies.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Upsert a company row, unique on name. Returns the row id.
    async fn upsert_company(&self, company: &CompanyInfo) -> PersistResult<CompanyId>;

    /// Upsert job rows keyed by `url` (update on conflict), linking them
    /// to `company` when given. Returns the number of rows written.
    async fn upsert_jobs(
        &self,
        jobs: &[JobPosting],
        company: Option<CompanyId>,
    ) -> PersistResult<u64>;

    /// Delete all jobs belonging to a company. Returns rows removed.
    async fn delete_company_jobs(&self, company: CompanyId) -> PersistResult<u64>;

    /// Replace a company's jobs with a fresh batch.
    ///
    /// Default implementation is delete-then-upsert; transactional
    /// stores should override to do both in one transaction.
    async fn replace_company_jobs(
        &self,
        company: CompanyId,
        jobs: &[JobPosting],
    ) -> PersistResult<u64> {
        self.delete_company_jobs(company).await?;
        self.upsert_jobs(jobs, Some(company)).await
    }
}

//! In-memory store implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use crate::error::{PersistError, PersistResult};
use crate::traits::store::{CompanyId, JobStore};
use crate::types::{company::CompanyInfo, job::JobPosting};

struct StoredJob {
    job: JobPosting,
    company: Option<CompanyId>,
}

/// In-memory job store.
///
/// Useful for tests and development. Data is lost on drop; the unique
/// keys (job `url`, company `name`) behave like their SQL counterparts.
#[derive(Default)]
pub struct MemoryStore {
    jobs: RwLock<HashMap<String, StoredJob>>,
    companies: RwLock<HashMap<String, (CompanyId, CompanyInfo)>>,
    next_id: AtomicI64,
    fail_writes: bool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Make every write fail, for exercising failure paths in tests.
    pub fn with_write_failures(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Number of stored jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    /// Number of stored companies.
    pub fn company_count(&self) -> usize {
        self.companies.read().unwrap().len()
    }

    /// Fetch a stored job by canonical URL.
    pub fn get_job(&self, url: &str) -> Option<JobPosting> {
        self.jobs.read().unwrap().get(url).map(|s| s.job.clone())
    }

    /// Jobs linked to a company.
    pub fn jobs_for_company(&self, company: CompanyId) -> Vec<JobPosting> {
        self.jobs
            .read()
            .unwrap()
            .values()
            .filter(|s| s.company == Some(company))
            .map(|s| s.job.clone())
            .collect()
    }

    fn check_writable(&self) -> PersistResult<()> {
        if self.fail_writes {
            Err(PersistError::Store("scripted write failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn upsert_company(&self, company: &CompanyInfo) -> PersistResult<CompanyId> {
        self.check_writable()?;
        let mut companies = self.companies.write().unwrap();
        if let Some((id, existing)) = companies.get_mut(&company.name) {
            *existing = company.clone();
            return Ok(*id);
        }
        let id = CompanyId(self.next_id.fetch_add(1, Ordering::SeqCst));
        companies.insert(company.name.clone(), (id, company.clone()));
        Ok(id)
    }

    async fn upsert_jobs(
        &self,
        jobs: &[JobPosting],
        company: Option<CompanyId>,
    ) -> PersistResult<u64> {
        self.check_writable()?;
        let mut stored = self.jobs.write().unwrap();
        for job in jobs {
            stored.insert(
                job.url.clone(),
                StoredJob {
                    job: job.clone(),
                    company,
                },
            );
        }
        Ok(jobs.len() as u64)
    }

    async fn delete_company_jobs(&self, company: CompanyId) -> PersistResult<u64> {
        self.check_writable()?;
        let mut stored = self.jobs.write().unwrap();
        let before = stored.len();
        stored.retain(|_, s| s.company != Some(company));
        Ok((before - stored.len()) as u64)
    }
}

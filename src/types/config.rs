//! Configuration for the scrape pipeline.

use serde::{Deserialize, Serialize};

/// Tunables for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum trimmed markdown length for a page to count as real
    /// content. Shorter pages fail the fetch step. Default: 50.
    pub min_content_len: usize,

    /// Search heuristic for the site-map augmentation pass.
    pub map_search: String,

    /// Search heuristic for the root-domain careers-page recovery.
    pub recovery_search: String,

    /// Candidate limit for the recovery map query. Default: 5.
    pub recovery_limit: usize,

    /// Derive and upsert company info before saving jobs. Default: true.
    pub save_company: bool,

    /// Delete the company's existing jobs before inserting the fresh
    /// batch, making each scrape a full replace instead of additive.
    /// Default: false.
    pub replace_company_jobs: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_content_len: 50,
            map_search: "job career opening posting".to_string(),
            recovery_search: "careers jobs openings".to_string(),
            recovery_limit: 5,
            save_company: true,
            replace_company_jobs: false,
        }
    }
}

impl PipelineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum content length.
    pub fn with_min_content_len(mut self, len: usize) -> Self {
        self.min_content_len = len;
        self
    }

    /// Enable or disable company upserts.
    pub fn with_save_company(mut self, save: bool) -> Self {
        self.save_company = save;
        self
    }

    /// Enable or disable full-replace persistence.
    pub fn with_replace_company_jobs(mut self, replace: bool) -> Self {
        self.replace_company_jobs = replace;
        self
    }
}

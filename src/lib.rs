//! Job-Posting Scraping & Structured-Extraction Pipeline
//!
//! Turns an arbitrary careers-page URL into structured job postings:
//! fetch the overview page, discover individual posting links (with a
//! bounded careers-page recovery when none are found), batch-fetch the
//! posting documents, extract each through a schema-constrained
//! language model, and upsert the results keyed by canonical URL.
//!
//! # Design
//!
//! - Providers are narrow trait seams ([`ScrapeProvider`],
//!   [`StructuredModel`], [`JobStore`]) so the pipeline is testable
//!   without a network and swappable in production.
//! - Each run owns its own [`PipelineState`]; progress is observable
//!   through a `watch` channel, never through globals.
//! - Extraction degrades instead of failing: an invalid model answer
//!   gets one retry with the validation errors fed back, then falls
//!   back to a minimal record that preserves the source markdown.
//!
//! # Usage
//!
//! ```rust,ignore
//! use jobscrape::{FirecrawlScraper, OpenAiModel, PostgresStore, ScrapePipeline};
//!
//! let provider = FirecrawlScraper::from_env()?;
//! let model = OpenAiModel::from_env()?;
//! let store = PostgresStore::new(&database_url).await?;
//!
//! let mut pipeline = ScrapePipeline::new(provider, model, store);
//! let progress = pipeline.subscribe();
//! let summary = pipeline.run("x.ai/careers/open-roles").await?;
//! println!("saved {} jobs", summary.jobs_saved);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Provider seams (scraper, model, store)
//! - [`types`] - Domain types (job, company, step state, config)
//! - [`pipeline`] - The orchestrated pipeline and its stages
//! - [`providers`] - Firecrawl and OpenAI implementations
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`testing`] - Scriptable mocks for tests

pub mod credentials;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use credentials::SecretString;
pub use error::{FetchError, ModelError, PersistError, PipelineError, Result};
pub use traits::{
    model::StructuredModel,
    scraper::{BatchDocument, Branding, PageMetadata, ScrapeOptions, ScrapeProvider, ScrapedPage},
    store::{CompanyId, JobStore},
};
pub use types::{
    company::CompanyInfo,
    config::PipelineConfig,
    job::{job_posting_schema, EmploymentType, JobPosting, Location, SalaryRange, WorkMode},
    step::{PipelineState, PipelineStep, StepStatus},
};

// Re-export the pipeline entry points
pub use pipeline::{ScrapePipeline, ScrapeSummary};
pub use pipeline::extract::extract_job;
pub use pipeline::fetch::normalize_url;
pub use pipeline::persist::{persist_jobs, PersistOutcome};

// Re-export providers and stores
pub use providers::{FirecrawlScraper, OpenAiModel};
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;

// Re-export testing utilities
pub use testing::{MockModel, MockScraper, ScraperCall};

//! The scrape pipeline orchestrator.
//!
//! Owns the per-run [`PipelineState`], sequences the four steps, and
//! publishes cloned snapshots through a `watch` channel after every
//! mutation. Exactly one step is in progress at a time; any error marks
//! the current step failed, records the message, and halts the run.
//!
//! The "no links found" recovery is an explicit bounded loop: at most
//! one restart against a heuristically-chosen careers URL, guarded by
//! the `is_recovery` flag.

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;

use crate::error::{PipelineError, Result};
use crate::pipeline::batch::{fetch_documents, try_fetch_titles};
use crate::pipeline::discover::{discover_links, find_recovery_candidate};
use crate::pipeline::extract::extract_job;
use crate::pipeline::fetch::{fetch_page, normalize_url};
use crate::pipeline::persist::persist_jobs;
use crate::traits::{model::StructuredModel, scraper::ScrapeProvider, store::JobStore};
use crate::traits::scraper::ScrapeOptions;
use crate::types::{
    company::CompanyInfo,
    config::PipelineConfig,
    job::JobPosting,
    step::{PipelineState, PipelineStep, StepStatus},
};

const STEP_FETCH: usize = 0;
const STEP_DISCOVER: usize = 1;
const STEP_EXTRACT: usize = 2;
const STEP_PERSIST: usize = 3;

/// Result of a successful pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSummary {
    /// Postings extracted in memory
    pub jobs_extracted: usize,
    /// Rows written to the store
    pub jobs_saved: u64,
    /// Whether the run went through the recovery restart
    pub recovered: bool,
}

enum RunControl {
    Done(ScrapeSummary),
    Restart(String),
}

fn default_steps() -> Vec<PipelineStep> {
    vec![
        PipelineStep::new("fetch", "Fetch overview", "Load the careers page"),
        PipelineStep::new("discover", "Discover job links", "Find individual job postings"),
        PipelineStep::new(
            "extract",
            "Fetch & extract job details",
            "Scrape each posting and extract structured data",
        ),
        PipelineStep::new("persist", "Save results", "Upsert companies and jobs"),
    ]
}

/// Orchestrates fetch → discover → extract → persist for one URL at a
/// time. Each instance owns its own step state; concurrent scrapes use
/// separate instances and only share the store.
pub struct ScrapePipeline<P, M, S> {
    provider: P,
    model: M,
    store: S,
    config: PipelineConfig,
    state: PipelineState,
    tx: watch::Sender<PipelineState>,
}

impl<P, M, S> ScrapePipeline<P, M, S>
where
    P: ScrapeProvider,
    M: StructuredModel,
    S: JobStore,
{
    /// Create a pipeline with default configuration.
    pub fn new(provider: P, model: M, store: S) -> Self {
        Self::with_config(provider, model, store, PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(provider: P, model: M, store: S, config: PipelineConfig) -> Self {
        let state = PipelineState::new(default_steps());
        let (tx, _) = watch::channel(state.clone());
        Self {
            provider,
            model,
            store,
            config,
            state,
            tx,
        }
    }

    /// Subscribe to live state snapshots.
    ///
    /// The receiver observes every step transition and detail update,
    /// including those from a recovery restart.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.tx.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// The backing store (for inspecting results after a run).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the full pipeline against a careers-page URL.
    ///
    /// On error the failing step is marked `Failed` with the message in
    /// its details, later steps stay `Pending`, and the same message
    /// lands in `state.error`.
    pub async fn run(&mut self, url: &str) -> Result<ScrapeSummary> {
        let mut target = url.to_string();
        let mut is_recovery = false;
        self.reset();

        loop {
            match self.run_once(&target, is_recovery).await {
                Ok(RunControl::Done(summary)) => return Ok(summary),
                Ok(RunControl::Restart(next)) => {
                    tracing::info!(from = %target, to = %next, "restarting pipeline via recovery URL");
                    is_recovery = true;
                    target = next;
                    self.reset();
                }
                Err(e) => {
                    self.fail_current(&e);
                    return Err(e);
                }
            }
        }
    }

    /// Convenience wrapper matching the caller-facing surface: success
    /// flag only, with state observable via [`subscribe`](Self::subscribe).
    pub async fn run_scrape(&mut self, url: &str) -> bool {
        self.run(url).await.is_ok()
    }

    async fn run_once(&mut self, url: &str, is_recovery: bool) -> Result<RunControl> {
        // Step 1: fetch the overview page
        self.start_step(STEP_FETCH);
        let base_url = normalize_url(url)?;
        self.push_detail(STEP_FETCH, format!("Fetching {}", base_url));
        let overview = fetch_page(
            &self.provider,
            &base_url,
            &ScrapeOptions::overview(),
            self.config.min_content_len,
        )
        .await?;
        if let Some(title) = overview.metadata.title.clone() {
            self.push_detail(STEP_FETCH, format!("Loaded: {}", title));
        }
        self.complete_step(STEP_FETCH);

        // Step 2: discover candidate job links
        self.start_step(STEP_DISCOVER);
        let links = discover_links(
            &self.model,
            &self.provider,
            &overview.markdown,
            &base_url,
            &self.config.map_search,
        )
        .await?;

        if links.is_empty() {
            if !is_recovery {
                if let Some(candidate) = find_recovery_candidate(
                    &self.provider,
                    &base_url,
                    &self.config.recovery_search,
                    self.config.recovery_limit,
                )
                .await
                {
                    self.push_detail(
                        STEP_DISCOVER,
                        format!("No job links found; retrying via {}", candidate),
                    );
                    return Ok(RunControl::Restart(candidate));
                }
            }
            return Err(PipelineError::NoLinksFound { url: base_url });
        }

        self.push_detail(STEP_DISCOVER, format!("Found {} candidate link(s)", links.len()));
        self.complete_step(STEP_DISCOVER);

        // Step 3: batch-fetch documents and extract concurrently
        self.start_step(STEP_EXTRACT);
        for link in &links {
            self.push_detail(STEP_EXTRACT, format!("Queued {}", link));
        }

        // Title previews run alongside the batch purely to improve the
        // live detail text; their failures never matter.
        let (documents, titles) = tokio::join!(
            fetch_documents(&self.provider, &links),
            try_fetch_titles(&self.provider, &links),
        );
        let documents = documents?;

        for (i, title) in titles.into_iter().enumerate() {
            if let Some(title) = title {
                self.set_detail(STEP_EXTRACT, i, format!("Fetched: {}", title));
            }
        }

        let jobs = {
            let model = &self.model;
            let mut tasks: FuturesUnordered<_> = documents
                .iter()
                .enumerate()
                .map(|(i, doc)| async move {
                    match &doc.markdown {
                        Some(markdown) => (i, Some(extract_job(model, markdown, &doc.url).await)),
                        None => (i, None),
                    }
                })
                .collect();

            // Fan-in: completion order is arbitrary, so detail updates
            // go back by index rather than being appended.
            let mut slots: Vec<Option<JobPosting>> = vec![None; documents.len()];
            while let Some((i, extracted)) = tasks.next().await {
                let detail = match &extracted {
                    Some(posting) => format!(
                        "Extracted: {}",
                        posting.title.as_deref().unwrap_or(&posting.url)
                    ),
                    None => format!("Skipped (no content): {}", documents[i].url),
                };
                self.state.steps[STEP_EXTRACT].details[i] = detail;
                let _ = self.tx.send(self.state.clone());
                slots[i] = extracted;
            }

            slots.into_iter().flatten().collect::<Vec<_>>()
        };

        self.push_detail(
            STEP_EXTRACT,
            format!("Extracted {} of {} document(s)", jobs.len(), documents.len()),
        );
        self.complete_step(STEP_EXTRACT);

        // Step 4: persist
        self.start_step(STEP_PERSIST);
        let company = if self.config.save_company {
            CompanyInfo::from_page(&overview, &base_url)
        } else {
            None
        };
        let outcome = persist_jobs(
            &self.store,
            &jobs,
            company.as_ref(),
            self.config.replace_company_jobs,
        )
        .await?;
        self.push_detail(STEP_PERSIST, format!("Saved {} job(s)", outcome.saved));
        self.complete_step(STEP_PERSIST);

        Ok(RunControl::Done(ScrapeSummary {
            jobs_extracted: jobs.len(),
            jobs_saved: outcome.saved,
            recovered: is_recovery,
        }))
    }

    fn reset(&mut self) {
        self.state = PipelineState::new(default_steps());
        self.publish();
    }

    fn start_step(&mut self, idx: usize) {
        self.state.steps[idx].status = StepStatus::InProgress;
        self.publish();
    }

    fn complete_step(&mut self, idx: usize) {
        self.state.steps[idx].status = StepStatus::Completed;
        self.publish();
    }

    fn push_detail(&mut self, idx: usize, detail: String) {
        self.state.steps[idx].details.push(detail);
        self.publish();
    }

    fn set_detail(&mut self, idx: usize, pos: usize, detail: String) {
        self.state.steps[idx].details[pos] = detail;
        self.publish();
    }

    fn fail_current(&mut self, error: &PipelineError) {
        let message = error.to_string();
        if let Some(step) = self
            .state
            .steps
            .iter_mut()
            .find(|s| s.status == StepStatus::InProgress)
        {
            step.status = StepStatus::Failed;
            step.details.push(message.clone());
        }
        self.state.error = Some(message);
        self.publish();
    }

    fn publish(&self) {
        let _ = self.tx.send(self.state.clone());
    }
}

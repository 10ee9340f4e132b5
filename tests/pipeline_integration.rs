//! End-to-end pipeline tests against the scriptable mocks.
//!
//! These exercise the public surface the way a route handler would:
//! build a pipeline over mock providers and a MemoryStore, run it, and
//! assert on the summary, the live step state, and the stored rows.

use jobscrape::{
    MemoryStore, MockModel, MockScraper, PipelineConfig, PipelineError, ScrapePipeline,
    StepStatus, WorkMode,
};

const OVERVIEW: &str = "# Careers at Acme\n\nWe are hiring across engineering and design.";

fn links_json(links: &[&str]) -> serde_json::Value {
    serde_json::json!({ "links": links })
}

#[tokio::test]
async fn scraping_same_url_twice_yields_one_row() {
    let provider = MockScraper::new()
        .with_page("https://acme.com/jobs", OVERVIEW)
        .with_page("https://acme.com/jobs/swe", "# Software Engineer\n\nRole details here.");
    let model = MockModel::new()
        .with_response(links_json(&["https://acme.com/jobs/swe"]))
        .with_response(links_json(&["https://acme.com/jobs/swe"]))
        .with_job_response(
            "https://acme.com/jobs/swe",
            serde_json::json!({ "title": "Software Engineer" }),
        )
        .with_job_response(
            "https://acme.com/jobs/swe",
            serde_json::json!({ "title": "Software Engineer (updated)" }),
        );
    let mut pipeline = ScrapePipeline::new(provider, model, MemoryStore::new());

    pipeline.run("https://acme.com/jobs").await.unwrap();
    pipeline.run("https://acme.com/jobs").await.unwrap();

    // Upsert-on-url: the second scrape updated, not duplicated
    assert_eq!(pipeline.store().job_count(), 1);
    let job = pipeline.store().get_job("https://acme.com/jobs/swe").unwrap();
    assert_eq!(job.title.as_deref(), Some("Software Engineer (updated)"));
}

#[tokio::test]
async fn replace_mode_keeps_only_second_batch() {
    let provider = MockScraper::new()
        .with_page_title("https://acme.com/jobs", OVERVIEW, "Acme | Careers")
        .with_page("https://acme.com/jobs/a", "# Role A\n\nFirst role description.")
        .with_page("https://acme.com/jobs/b", "# Role B\n\nSecond role description.")
        .with_page("https://acme.com/jobs/c", "# Role C\n\nThird role description.");
    let model = MockModel::new()
        .with_response(links_json(&["https://acme.com/jobs/a", "https://acme.com/jobs/b"]))
        .with_response(links_json(&["https://acme.com/jobs/c"]))
        .with_job_response("https://acme.com/jobs/a", serde_json::json!({ "title": "A" }))
        .with_job_response("https://acme.com/jobs/b", serde_json::json!({ "title": "B" }))
        .with_job_response("https://acme.com/jobs/c", serde_json::json!({ "title": "C" }));
    let config = PipelineConfig::default().with_replace_company_jobs(true);
    let mut pipeline =
        ScrapePipeline::with_config(provider, model, MemoryStore::new(), config);

    let first = pipeline.run("https://acme.com/jobs").await.unwrap();
    assert_eq!(first.jobs_saved, 2);

    let second = pipeline.run("https://acme.com/jobs").await.unwrap();
    assert_eq!(second.jobs_saved, 1);

    // Full-replace semantics: count equals the second scrape, not the sum
    assert_eq!(pipeline.store().job_count(), 1);
    assert!(pipeline.store().get_job("https://acme.com/jobs/c").is_some());
    assert!(pipeline.store().get_job("https://acme.com/jobs/a").is_none());
}

#[tokio::test]
async fn degraded_extraction_still_persists() {
    // The model never produces a valid posting; the pipeline still
    // saves a minimal record with the source markdown as description.
    let markdown = "# Mystery Role\n\nSomething about a job, oddly formatted.";
    let provider = MockScraper::new()
        .with_page("https://acme.com/jobs", OVERVIEW)
        .with_page("https://acme.com/jobs/mystery", markdown);
    let model = MockModel::new()
        .with_response(links_json(&["https://acme.com/jobs/mystery"]))
        .with_job_response(
            "https://acme.com/jobs/mystery",
            serde_json::json!({ "title": "Mystery Role", "workMode": "SOMETIMES" }),
        )
        .with_job_response(
            "https://acme.com/jobs/mystery",
            serde_json::json!({ "title": "Mystery Role", "workMode": "MOSTLY" }),
        );
    let mut pipeline = ScrapePipeline::new(provider, model, MemoryStore::new());

    let summary = pipeline.run("https://acme.com/jobs").await.unwrap();

    assert_eq!(summary.jobs_saved, 1);
    let job = pipeline.store().get_job("https://acme.com/jobs/mystery").unwrap();
    assert_eq!(job.work_mode, WorkMode::Unknown);
    assert_eq!(job.description.as_deref(), Some(markdown));
    assert_eq!(job.title.as_deref(), Some("Mystery Role"));
}

#[tokio::test]
async fn no_links_found_is_user_readable() {
    let provider = MockScraper::new().with_page("https://acme.com/blog", OVERVIEW);
    let model = MockModel::new().with_response(links_json(&[]));
    let mut pipeline = ScrapePipeline::new(provider, model, MemoryStore::new());

    let err = pipeline.run("https://acme.com/blog").await.unwrap_err();

    assert!(matches!(err, PipelineError::NoLinksFound { .. }));
    assert!(err.to_string().contains("no job links found"));
    let state = pipeline.state();
    assert_eq!(state.error.as_deref(), Some(err.to_string().as_str()));
    assert_eq!(state.steps[1].status, StepStatus::Failed);
}

#[tokio::test]
async fn batch_transport_failure_halts_extract_step() {
    let provider = MockScraper::new()
        .with_page("https://acme.com/jobs", OVERVIEW)
        .with_batch_failure();
    let model = MockModel::new().with_response(links_json(&["https://acme.com/jobs/swe"]));
    let mut pipeline = ScrapePipeline::new(provider, model, MemoryStore::new());

    let err = pipeline.run("https://acme.com/jobs").await.unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(_)));
    let state = pipeline.state();
    assert_eq!(state.steps[2].status, StepStatus::Failed);
    assert_eq!(state.steps[3].status, StepStatus::Pending);
}

#[tokio::test]
async fn progress_observable_without_polling_the_pipeline() {
    let provider = MockScraper::new()
        .with_page("https://acme.com/jobs", OVERVIEW)
        .with_page("https://acme.com/jobs/swe", "# SWE\n\nA fine role, remote friendly.");
    let model = MockModel::new()
        .with_response(links_json(&["https://acme.com/jobs/swe"]))
        .with_job_response("https://acme.com/jobs/swe", serde_json::json!({ "title": "SWE" }));
    let mut pipeline = ScrapePipeline::new(provider, model, MemoryStore::new());
    let rx = pipeline.subscribe();

    pipeline.run("https://acme.com/jobs").await.unwrap();

    let snapshot = rx.borrow().clone();
    assert!(snapshot.is_complete());
    assert!(snapshot.steps[2]
        .details
        .iter()
        .any(|d| d.starts_with("Extracted")));
}

#[tokio::test]
async fn run_scrape_returns_plain_success_flag() {
    let provider = MockScraper::new().with_page("https://acme.com/jobs", "too short");
    let model = MockModel::new();
    let mut pipeline = ScrapePipeline::new(provider, model, MemoryStore::new());

    assert!(!pipeline.run_scrape("https://acme.com/jobs").await);
    assert!(pipeline.state().error.is_some());
}

//! Schema-constrained job extraction with a bounded retry and a
//! minimal-record fallback.
//!
//! Extraction never fails outright: an invalid result gets exactly one
//! retry with the validation errors embedded in the prompt, and a
//! second failure degrades to a partial-but-truthful record carrying
//! the source markdown as its description.

use std::fmt;

use crate::traits::model::StructuredModel;
use crate::types::job::{job_posting_schema, JobPosting, WorkMode};

/// Validation issues collected from a model response.
///
/// Internal to the extraction stage; never crosses the pipeline
/// boundary.
#[derive(Debug)]
pub struct ValidationFailure {
    pub issues: Vec<String>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.issues.join("; "))
    }
}

fn extract_prompt(markdown: &str, url: &str) -> String {
    format!(
        "Extract the job posting from this page into the provided schema.\n\
         Source URL: {url}\n\
         Rules:\n\
         - workMode is one of REMOTE, HYBRID, ONSITE, UNKNOWN; use UNKNOWN when unstated.\n\
         - employmentType is one of FULL_TIME, PART_TIME, CONTRACT, TEMPORARY, INTERN, \
         VOLUNTEER, OTHER, or null.\n\
         - Leave fields null rather than guessing. Do not invent salary figures.\n\n\
         PAGE MARKDOWN:\n{markdown}",
        url = url,
        markdown = markdown,
    )
}

fn retry_prompt(markdown: &str, url: &str, failure: &ValidationFailure) -> String {
    format!(
        "Your previous answer failed validation:\n{issues}\n\n\
         Correct these problems and answer again.\n\n{base}",
        issues = failure
            .issues
            .iter()
            .map(|i| format!("- {}", i))
            .collect::<Vec<_>>()
            .join("\n"),
        base = extract_prompt(markdown, url),
    )
}

/// Validate a model response against the posting schema.
///
/// The caller's URL is authoritative: it is force-set before validation
/// so a model that omits or mangles `url` cannot fail on it.
fn validate(mut value: serde_json::Value, url: &str) -> Result<JobPosting, ValidationFailure> {
    if let Some(obj) = value.as_object_mut() {
        obj.insert("url".to_string(), serde_json::Value::String(url.to_string()));
    } else {
        return Err(ValidationFailure {
            issues: vec![format!("expected a JSON object, got {}", value)],
        });
    }

    serde_json::from_value(value).map_err(|e| ValidationFailure {
        issues: vec![e.to_string()],
    })
}

/// Build the degraded fallback record.
///
/// Scavenges `title` and `companyName` from the rejected value when
/// they are plain strings; everything else is null except the source
/// markdown, preserved as the description.
fn minimal_record(last_value: Option<&serde_json::Value>, markdown: &str, url: &str) -> JobPosting {
    let scavenge = |field: &str| {
        last_value
            .and_then(|v| v.get(field))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    JobPosting {
        url: url.to_string(),
        title: scavenge("title"),
        company_name: scavenge("companyName"),
        job_locations: Vec::new(),
        work_mode: WorkMode::Unknown,
        employment_type: None,
        description: Some(markdown.to_string()),
        base_salary: None,
        date_posted: None,
        valid_through: None,
        direct_apply_url: None,
    }
}

/// Extract a job posting from a document's markdown.
///
/// Two attempts against the model (the second carrying validation
/// errors), then the minimal-record fallback. The returned posting
/// always has `url` populated and, on fallback, the full markdown as
/// `description`.
pub async fn extract_job<M: StructuredModel + ?Sized>(
    model: &M,
    markdown: &str,
    url: &str,
) -> JobPosting {
    let schema = job_posting_schema();

    let mut last_value: Option<serde_json::Value> = None;
    let mut last_failure: Option<ValidationFailure> = None;

    for attempt in 0..2 {
        let prompt = match &last_failure {
            None => extract_prompt(markdown, url),
            Some(failure) => retry_prompt(markdown, url, failure),
        };

        match model.generate_structured(&prompt, &schema).await {
            Ok(value) => {
                last_value = Some(value.clone());
                match validate(value, url) {
                    Ok(mut posting) => {
                        if posting.description.is_none() {
                            posting.description = Some(markdown.to_string());
                        }
                        return posting;
                    }
                    Err(failure) => {
                        tracing::debug!(url = %url, attempt, issues = %failure, "validation failed");
                        last_failure = Some(failure);
                    }
                }
            }
            Err(e) => {
                tracing::debug!(url = %url, attempt, error = %e, "model call failed");
                last_failure = Some(ValidationFailure {
                    issues: vec![e.to_string()],
                });
            }
        }
    }

    tracing::warn!(url = %url, "extraction degraded to minimal record");
    minimal_record(last_value.as_ref(), markdown, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;
    use crate::types::job::EmploymentType;

    const MARKDOWN: &str = "# Software Engineer\n\nRemote. Build things.";
    const URL: &str = "https://acme.com/jobs/swe";

    #[tokio::test]
    async fn test_valid_response_first_try() {
        let model = MockModel::new().with_response(serde_json::json!({
            "title": "Software Engineer",
            "companyName": "Acme",
            "workMode": "REMOTE",
            "employmentType": "FULL_TIME",
            "url": "https://mangled.example/wrong"
        }));

        let posting = extract_job(&model, MARKDOWN, URL).await;

        assert_eq!(posting.title.as_deref(), Some("Software Engineer"));
        assert_eq!(posting.work_mode, WorkMode::Remote);
        assert_eq!(posting.employment_type, Some(EmploymentType::FullTime));
        // Caller's URL wins over the model's
        assert_eq!(posting.url, URL);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_carries_validation_errors() {
        let model = MockModel::new()
            .with_response(serde_json::json!({
                "title": "Software Engineer",
                "workMode": "WORK_FROM_BEACH"
            }))
            .with_response(serde_json::json!({
                "title": "Software Engineer",
                "workMode": "REMOTE"
            }));

        let posting = extract_job(&model, MARKDOWN, URL).await;

        assert_eq!(posting.work_mode, WorkMode::Remote);
        assert_eq!(model.call_count(), 2);
        // The retry prompt must mention the earlier failure
        let prompts = model.prompts();
        assert!(prompts[1].contains("failed validation"));
    }

    #[tokio::test]
    async fn test_minimal_record_after_two_failures() {
        let model = MockModel::new()
            .with_response(serde_json::json!({
                "title": "Software Engineer",
                "companyName": "Acme",
                "workMode": "BAD"
            }))
            .with_response(serde_json::json!({
                "title": "Software Engineer",
                "companyName": "Acme",
                "workMode": "STILL_BAD"
            }));

        let posting = extract_job(&model, MARKDOWN, URL).await;

        // Never throws; url and description always populated
        assert_eq!(posting.url, URL);
        assert_eq!(posting.description.as_deref(), Some(MARKDOWN));
        assert_eq!(posting.work_mode, WorkMode::Unknown);
        // Scavenged raw strings survive
        assert_eq!(posting.title.as_deref(), Some("Software Engineer"));
        assert_eq!(posting.company_name.as_deref(), Some("Acme"));
        assert!(posting.base_salary.is_none());
    }

    #[tokio::test]
    async fn test_model_transport_failure_degrades() {
        // Nothing scripted and failures forced: both calls error
        let model = MockModel::new().with_failures();

        let posting = extract_job(&model, MARKDOWN, URL).await;

        assert_eq!(posting.url, URL);
        assert_eq!(posting.description.as_deref(), Some(MARKDOWN));
        assert!(posting.title.is_none());
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_description_backfilled_from_markdown() {
        let model = MockModel::new().with_response(serde_json::json!({
            "title": "Software Engineer"
        }));

        let posting = extract_job(&model, MARKDOWN, URL).await;
        assert_eq!(posting.description.as_deref(), Some(MARKDOWN));
    }

    #[tokio::test]
    async fn test_non_object_response_degrades() {
        let model = MockModel::new()
            .with_response(serde_json::json!("just a string"))
            .with_response(serde_json::json!([1, 2, 3]));

        let posting = extract_job(&model, MARKDOWN, URL).await;
        assert_eq!(posting.url, URL);
        assert_eq!(posting.description.as_deref(), Some(MARKDOWN));
    }
}

//! The canonical extracted job-posting entity and its schema.
//!
//! `JobPosting` is both the wire shape the language model is constrained
//! to (via [`job_posting_schema`]) and the row shape handed to the store.
//! Field names are camelCase on the wire to match what job boards and
//! schema.org-style markup use, which measurably helps model accuracy.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

/// A single job posting extracted from a careers page.
///
/// `url` is the canonical identity: it is always populated before a
/// posting leaves the extraction stage (back-filled from the request URL
/// when the model omits it) and is the dedup key for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    /// Canonical posting URL (uniqueness key for upserts)
    pub url: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub company_name: Option<String>,

    /// A posting may list several offices; empty when unknown
    #[serde(default)]
    pub job_locations: Vec<Location>,

    /// Never absent; defaults to [`WorkMode::Unknown`] when unresolved
    #[serde(default)]
    pub work_mode: WorkMode,

    #[serde(default)]
    pub employment_type: Option<EmploymentType>,

    /// Carries the raw page markdown as a fallback when the model
    /// returns nothing, so partial extraction still preserves content
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub base_salary: Option<SalaryRange>,

    /// ISO date string as published on the page
    #[serde(default)]
    pub date_posted: Option<String>,

    /// ISO date string; application deadline if stated
    #[serde(default)]
    pub valid_through: Option<String>,

    #[serde(default)]
    pub direct_apply_url: Option<String>,
}

impl JobPosting {
    /// Create a posting with only the canonical URL set.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            company_name: None,
            job_locations: Vec::new(),
            work_mode: WorkMode::Unknown,
            employment_type: None,
            description: None,
            base_salary: None,
            date_posted: None,
            valid_through: None,
            direct_apply_url: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the company name.
    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the work mode.
    pub fn with_work_mode(mut self, mode: WorkMode) -> Self {
        self.work_mode = mode;
        self
    }
}

/// One location a posting is offered in; all parts optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub raw_address: Option<String>,
}

/// Where the work happens.
///
/// Restricted enumeration: any other model output fails schema
/// validation and triggers the extraction retry path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkMode {
    Remote,
    Hybrid,
    Onsite,
    #[default]
    Unknown,
}

/// Employment arrangement for a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Temporary,
    Intern,
    Volunteer,
    Other,
}

/// Advertised salary range.
///
/// Sub-fields are independently optional; no currency defaulting, to
/// avoid implying values not present in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRange {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    /// Pay period, e.g. "YEAR", "MONTH", "HOUR"
    #[serde(default)]
    pub unit_text: Option<String>,
}

/// JSON Schema the extraction model is constrained to.
pub fn job_posting_schema() -> serde_json::Value {
    let schema = schema_for!(JobPosting);
    serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&WorkMode::Remote).unwrap(),
            "\"REMOTE\""
        );
        let parsed: WorkMode = serde_json::from_str("\"HYBRID\"").unwrap();
        assert_eq!(parsed, WorkMode::Hybrid);
    }

    #[test]
    fn test_unknown_work_mode_rejected() {
        let result: Result<WorkMode, _> = serde_json::from_str("\"FLEXIBLE\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_employment_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&EmploymentType::FullTime).unwrap(),
            "\"FULL_TIME\""
        );
    }

    #[test]
    fn test_minimal_posting_deserializes() {
        // Only url is required; everything else defaults
        let posting: JobPosting =
            serde_json::from_str(r#"{"url": "https://acme.com/jobs/swe"}"#).unwrap();
        assert_eq!(posting.url, "https://acme.com/jobs/swe");
        assert_eq!(posting.work_mode, WorkMode::Unknown);
        assert!(posting.title.is_none());
        assert!(posting.job_locations.is_empty());
    }

    #[test]
    fn test_camel_case_wire_form() {
        let posting = JobPosting::new("https://acme.com/jobs/swe")
            .with_company_name("Acme")
            .with_work_mode(WorkMode::Remote);
        let value = serde_json::to_value(&posting).unwrap();
        assert_eq!(value["companyName"], "Acme");
        assert_eq!(value["workMode"], "REMOTE");
    }

    #[test]
    fn test_schema_has_required_url() {
        let schema = job_posting_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "url"));
    }
}

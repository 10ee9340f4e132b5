//! Live pipeline progress state.
//!
//! Each pipeline run owns one [`PipelineState`] value and publishes
//! cloned snapshots through a `tokio::sync::watch` channel. There are no
//! ambient globals; two concurrent runs never share step state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a single pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// One named, independently-reportable stage of the pipeline.
///
/// `details` is mutated incrementally while the step runs and is how
/// callers observe progress before the step completes. Per-document
/// updates are written back by index, not appended, so out-of-order
/// completion cannot corrupt the view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: StepStatus,
    pub details: Vec<String>,
}

impl PipelineStep {
    /// Create a pending step.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            status: StepStatus::Pending,
            details: Vec::new(),
        }
    }
}

/// Snapshot of a full pipeline run, published to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub steps: Vec<PipelineStep>,
    /// Human-readable error once a step has failed
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl PipelineState {
    /// Create a fresh state with all steps pending.
    pub fn new(steps: Vec<PipelineStep>) -> Self {
        Self {
            steps,
            error: None,
            started_at: Utc::now(),
        }
    }

    /// The step currently in progress, if any.
    pub fn current_step(&self) -> Option<&PipelineStep> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::InProgress)
    }

    /// Whether every step completed.
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }

    /// Whether any step failed.
    pub fn is_failed(&self) -> bool {
        self.steps.iter().any(|s| s.status == StepStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_all_pending() {
        let state = PipelineState::new(vec![
            PipelineStep::new("fetch", "Fetch overview", "Fetch the careers page"),
            PipelineStep::new("discover", "Discover links", "Find job posting links"),
        ]);
        assert!(state.current_step().is_none());
        assert!(!state.is_complete());
        assert!(!state.is_failed());
    }

    #[test]
    fn test_status_wire_form() {
        assert_eq!(
            serde_json::to_string(&StepStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }
}

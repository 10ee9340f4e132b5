//! Language-model seam.
//!
//! One call shape covers both uses in the pipeline: link discovery and
//! job-detail extraction are each a prompt plus a JSON Schema the model
//! must satisfy. Implementations wrap a concrete provider (see
//! [`OpenAiModel`](crate::providers::OpenAiModel)) or a mock.

use async_trait::async_trait;

use crate::error::ModelResult;

/// A model that produces schema-constrained structured output.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    /// Generate a JSON value satisfying `schema` from `prompt`.
    ///
    /// The returned value is *claimed* to match the schema; callers
    /// still validate, since models drift.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> ModelResult<serde_json::Value>;

    /// Model name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

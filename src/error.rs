//! Typed errors for the scraping pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Only errors that make
//! forward progress impossible cross the pipeline boundary; best-effort
//! sub-tasks (title previews, site-map augmentation) log a warning and
//! return `None` instead of raising.

use thiserror::Error;

/// Errors that can occur while fetching pages from the scrape provider.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed even after protocol normalization
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider returned a non-success status
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Provider answered but reported failure or returned no data
    #[error("provider error: {0}")]
    Provider(String),

    /// Page content too short to be a real posting page
    #[error("content too short for {url} ({len} chars)")]
    ContentTooShort { url: String, len: usize },

    /// Provider call timed out
    #[error("timeout fetching: {url}")]
    Timeout { url: String },
}

/// Errors from the structured-output language model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Model endpoint returned a non-success status
    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response was not parseable as the requested structure
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// Client misconfiguration (missing key, bad base URL)
    #[error("model config error: {0}")]
    Config(String),
}

/// Errors from the backing store.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Store rejected the write (constraint violation, bad row, ...)
    #[error("store error: {0}")]
    Store(String),

    /// Could not reach the store at all
    #[error("store connection error: {0}")]
    Connection(String),
}

/// Top-level pipeline errors surfaced to callers.
///
/// The variant message is what ends up in the failed step's `details`
/// and in the pipeline state's `error` slot.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Page fetch failed (bad URL, provider error, content too short)
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Link discovery or extraction model call failed
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    /// Discovery and the single recovery attempt both came up empty
    #[error("no job links found on {url}")]
    NoLinksFound { url: String },

    /// Persistence failed; extracted results remain in memory
    #[error("persistence failed: {0}")]
    Persist(#[from] PersistError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for provider fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Result type alias for store operations.
pub type PersistResult<T> = std::result::Result<T, PersistError>;

//! Typed errors for the ingestion pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on failure classes, in particular transient vs. permanent storage errors.

use thiserror::Error;

use crate::types::job::JobSource;

/// Errors raised by source fetchers.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream returned a non-success HTTP status
    #[error("upstream unavailable (HTTP {status})")]
    Upstream { status: u16 },

    /// Authentication with the upstream API was rejected
    #[error("upstream rejected credentials")]
    Auth,

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Scraping bridge subprocess failed (non-zero exit, missing output)
    #[error("scraping bridge failed: {reason}")]
    Bridge { reason: String },

    /// Source payload could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Query was malformed before any fetch was attempted
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique-constraint violation on the (source, external_id) dedup key.
    ///
    /// Importers treat this as a benign skip, never a failure: two
    /// concurrent imports of the same job race to insert and the loser
    /// lands here.
    #[error("duplicate job for dedup key {job_source}/{external_id}")]
    Duplicate {
        // Named job_source so thiserror does not treat it as Error::source()
        job_source: JobSource,
        external_id: String,
    },

    /// Transient failure (timeout, connection reset) - safe to retry
    #[error("transient storage error: {0}")]
    Transient(String),

    /// Constraint violation other than the dedup key - not retried
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Any other backend failure
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Whether this error is worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Errors that can surface from a full pipeline invocation.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source fetcher failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Storage operation failed
    #[error("storage failed: {0}")]
    Store(#[from] StoreError),

    /// The import run could not be created, so nothing was attempted
    #[error("import run could not start: {0}")]
    RunNotStarted(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Result type alias for fetcher operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

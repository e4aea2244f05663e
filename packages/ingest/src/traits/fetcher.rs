//! Source fetcher trait for pluggable job sources.
//!
//! Every source (commercial API, scraping bridge, uploaded CSV) implements
//! the same contract, differing only in transport. Zero results is a normal
//! outcome; only network, auth, subprocess, or parse failures are errors.

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::job::{JobSource, RawJob, SearchParams};

/// A source of raw job postings.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch raw records for a query.
    ///
    /// Returns `Ok(vec![])` on zero results; errors only for transport or
    /// parse failures.
    async fn fetch(&self, query: &SearchParams) -> FetchResult<Vec<RawJob>>;

    /// The provenance tag stamped onto records from this fetcher.
    fn source(&self) -> JobSource;

    /// Fetcher name for logging.
    fn name(&self) -> &str {
        self.source().as_str()
    }
}

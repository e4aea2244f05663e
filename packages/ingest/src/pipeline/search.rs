//! Search orchestration: refresh from upstream, serve from the store, and
//! degrade to demo data rather than surfacing pipeline errors to users.

use tracing::warn;

use crate::fallback::demo_jobs;
use crate::retry::RetryPolicy;
use crate::traits::fetcher::SourceFetcher;
use crate::traits::store::{IngestStore, JobStore};
use crate::types::job::{JobRecord, SearchParams};
use crate::types::saved_search::JobFilters;

use super::import::run_pipeline;

/// Where the served result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOrigin {
    /// Jobs from local storage
    Store,
    /// Built-in demo data (store was empty or unreachable)
    Fallback,
}

/// A caller-visible search result, never an error.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub jobs: Vec<JobRecord>,
    pub origin: ResultOrigin,
    /// True when an upstream refresh was attempted and failed; the UI may
    /// hint that results are limited.
    pub upstream_degraded: bool,
}

impl SearchParams {
    /// The store-side filters equivalent to these search parameters.
    pub fn to_filters(&self) -> JobFilters {
        let mut filters = JobFilters::new();
        if let Some(search) = &self.search {
            if !search.trim().is_empty() {
                filters = filters.with_search(search.trim());
            }
        }
        if let Some(location) = &self.location {
            if !location.trim().is_empty() {
                filters = filters.with_location(location.trim());
            }
        }
        filters
    }
}

/// Serve a search from the store, degrading to demo data when the store
/// errors or holds nothing at all. Never fails.
pub async fn search_with_fallback<S>(
    store: &S,
    filters: &JobFilters,
    limit: usize,
) -> SearchOutcome
where
    S: JobStore + ?Sized,
{
    match store.search_jobs(filters, limit).await {
        Ok(jobs) if !jobs.is_empty() => SearchOutcome {
            jobs,
            origin: ResultOrigin::Store,
            upstream_degraded: false,
        },
        Ok(_) => {
            // Nothing matched; when the store is empty entirely, show the
            // demo set so the page is never blank.
            let total = store.count_jobs().await.unwrap_or(0);
            if total == 0 {
                SearchOutcome {
                    jobs: demo_jobs(),
                    origin: ResultOrigin::Fallback,
                    upstream_degraded: false,
                }
            } else {
                SearchOutcome {
                    jobs: Vec::new(),
                    origin: ResultOrigin::Store,
                    upstream_degraded: false,
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "store search failed, serving demo data");
            SearchOutcome {
                jobs: demo_jobs(),
                origin: ResultOrigin::Fallback,
                upstream_degraded: true,
            }
        }
    }
}

/// Refresh from upstream, then serve. A fetcher failure is logged and
/// degraded: the caller still gets a non-empty result set (cached jobs, or
/// demo data when the store has nothing).
pub async fn refresh_and_search<F, S>(
    fetcher: &F,
    query: &SearchParams,
    store: &S,
    policy: &RetryPolicy,
    limit: usize,
) -> SearchOutcome
where
    F: SourceFetcher + ?Sized,
    S: IngestStore + ?Sized,
{
    let degraded = match run_pipeline(fetcher, query, store, policy).await {
        Ok(_) => false,
        Err(e) => {
            warn!(fetcher = fetcher.name(), error = %e, "upstream refresh failed, serving cached data");
            true
        }
    };

    let mut outcome = search_with_fallback(store, &query.to_filters(), limit).await;
    outcome.upstream_degraded = outcome.upstream_degraded || degraded;

    // A degraded refresh with an empty cache still serves demo data
    if degraded && outcome.jobs.is_empty() {
        outcome.jobs = demo_jobs();
        outcome.origin = ResultOrigin::Fallback;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::MockFetcher;
    use crate::types::job::RawJob;
    use std::time::Duration;

    fn quick() -> RetryPolicy {
        RetryPolicy::new(1, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_demo_data() {
        let store = MemoryStore::new();
        let fetcher = MockFetcher::new().failing();

        let outcome = refresh_and_search(
            &fetcher,
            &SearchParams::new("engineer"),
            &store,
            &quick(),
            20,
        )
        .await;

        // The caller-visible list is non-empty despite the upstream error
        assert!(!outcome.jobs.is_empty());
        assert_eq!(outcome.origin, ResultOrigin::Fallback);
        assert!(outcome.upstream_degraded);
    }

    #[tokio::test]
    async fn test_fetch_failure_serves_cached_jobs_when_present() {
        let store = MemoryStore::new();
        let seeded = crate::types::job::JobRecord::new(
            crate::types::job::JobSource::Api,
            "c1",
            "Cached engineer",
            "desc",
        );
        store.insert_job(&seeded).await.unwrap();

        let fetcher = MockFetcher::new().failing();
        let outcome = refresh_and_search(
            &fetcher,
            &SearchParams::new("engineer"),
            &store,
            &quick(),
            20,
        )
        .await;

        assert_eq!(outcome.jobs.len(), 1);
        assert_eq!(outcome.origin, ResultOrigin::Store);
        assert!(outcome.upstream_degraded);
    }

    #[tokio::test]
    async fn test_successful_refresh_serves_fresh_jobs() {
        let store = MemoryStore::new();
        let fetcher =
            MockFetcher::new().with_job(RawJob::new("Fresh engineer", "desc").with_id("f1"));

        let outcome = refresh_and_search(
            &fetcher,
            &SearchParams::new("engineer"),
            &store,
            &quick(),
            20,
        )
        .await;

        assert_eq!(outcome.jobs.len(), 1);
        assert_eq!(outcome.jobs[0].title, "Fresh engineer");
        assert_eq!(outcome.origin, ResultOrigin::Store);
        assert!(!outcome.upstream_degraded);
    }

    #[tokio::test]
    async fn test_no_match_in_populated_store_returns_empty() {
        let store = MemoryStore::new();
        let seeded = crate::types::job::JobRecord::new(
            crate::types::job::JobSource::Api,
            "c1",
            "Accountant",
            "numbers",
        );
        store.insert_job(&seeded).await.unwrap();

        let outcome =
            search_with_fallback(&store, &JobFilters::new().with_search("engineer"), 20).await;
        // Store has data, just nothing matching: an empty list is honest
        assert!(outcome.jobs.is_empty());
        assert_eq!(outcome.origin, ResultOrigin::Store);
    }
}

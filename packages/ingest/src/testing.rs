//! Testing utilities including mock implementations.
//!
//! These are useful for testing code that drives the pipeline without real
//! network calls or a real database.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{FetchError, FetchResult, StoreError, StoreResult};
use crate::traits::fetcher::SourceFetcher;
use crate::traits::store::{
    InsertOutcome, JobStore, NotificationStore, RunStore, SavedSearchStore, ScheduleStore,
};
use crate::types::{
    job::{JobRecord, JobSource, RawJob, SearchParams},
    notification::Notification,
    run::{ImportRun, RunStatus},
    saved_search::{JobFilters, SavedSearch},
    schedule::ImportSchedule,
};

/// A mock source fetcher with configurable results and failure injection.
pub struct MockFetcher {
    source: JobSource,
    jobs: Arc<RwLock<Vec<RawJob>>>,
    fail: bool,
    calls: Arc<AtomicU32>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            source: JobSource::Api,
            jobs: Arc::new(RwLock::new(Vec::new())),
            fail: false,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_source(mut self, source: JobSource) -> Self {
        self.source = source;
        self
    }

    /// Add a raw record to every fetch result.
    pub fn with_job(self, job: RawJob) -> Self {
        self.jobs.write().unwrap().push(job);
        self
    }

    /// Make every fetch fail with an upstream-unavailable error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of fetch calls made so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for MockFetcher {
    async fn fetch(&self, _query: &SearchParams) -> FetchResult<Vec<RawJob>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::Upstream { status: 503 });
        }
        Ok(self.jobs.read().unwrap().clone())
    }

    fn source(&self) -> JobSource {
        self.source
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A store wrapper that fails the first N `insert_job` calls with a
/// transient error, then delegates. Everything else passes straight
/// through. Used to exercise the retry budget.
pub struct FlakyStore<S> {
    inner: S,
    remaining_failures: AtomicU32,
    remaining_outcome_failures: AtomicU32,
    insert_attempts: AtomicU32,
}

impl<S> FlakyStore<S> {
    pub fn new(inner: S, failures: u32) -> Self {
        Self {
            inner,
            remaining_failures: AtomicU32::new(failures),
            remaining_outcome_failures: AtomicU32::new(0),
            insert_attempts: AtomicU32::new(0),
        }
    }

    /// Also fail the first N `record_outcomes` calls with a transient error.
    pub fn with_outcome_failures(self, failures: u32) -> Self {
        self.remaining_outcome_failures
            .store(failures, Ordering::SeqCst);
        self
    }

    /// Total `insert_job` attempts seen, including failed ones.
    pub fn insert_attempts(&self) -> u32 {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: JobStore> JobStore for FlakyStore<S> {
    async fn insert_job(&self, job: &JobRecord) -> StoreResult<InsertOutcome> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Transient("injected connection reset".into()));
        }
        self.inner.insert_job(job).await
    }

    async fn get_job(
        &self,
        source: JobSource,
        external_id: &str,
    ) -> StoreResult<Option<JobRecord>> {
        self.inner.get_job(source, external_id).await
    }

    async fn search_jobs(&self, filters: &JobFilters, limit: usize) -> StoreResult<Vec<JobRecord>> {
        self.inner.search_jobs(filters, limit).await
    }

    async fn count_jobs(&self) -> StoreResult<usize> {
        self.inner.count_jobs().await
    }
}

#[async_trait]
impl<S: RunStore> RunStore for FlakyStore<S> {
    async fn create_run(&self, run: &ImportRun) -> StoreResult<()> {
        self.inner.create_run(run).await
    }

    async fn record_outcomes(
        &self,
        run_id: Uuid,
        imported: usize,
        skipped: usize,
        failed: usize,
    ) -> StoreResult<()> {
        let remaining = self.remaining_outcome_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_outcome_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Transient("injected counter timeout".into()));
        }
        self.inner
            .record_outcomes(run_id, imported, skipped, failed)
            .await
    }

    async fn finalize_run(&self, run_id: Uuid, status: RunStatus) -> StoreResult<()> {
        self.inner.finalize_run(run_id, status).await
    }

    async fn get_run(&self, run_id: Uuid) -> StoreResult<Option<ImportRun>> {
        self.inner.get_run(run_id).await
    }
}

#[async_trait]
impl<S: SavedSearchStore> SavedSearchStore for FlakyStore<S> {
    async fn store_saved_search(&self, search: &SavedSearch) -> StoreResult<()> {
        self.inner.store_saved_search(search).await
    }

    async fn saved_searches_to_notify(&self) -> StoreResult<Vec<SavedSearch>> {
        self.inner.saved_searches_to_notify().await
    }

    async fn saved_searches_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<SavedSearch>> {
        self.inner.saved_searches_for_owner(owner_id).await
    }

    async fn delete_saved_search(&self, id: Uuid, owner_id: Uuid) -> StoreResult<()> {
        self.inner.delete_saved_search(id, owner_id).await
    }
}

#[async_trait]
impl<S: NotificationStore> NotificationStore for FlakyStore<S> {
    async fn store_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.inner.store_notification(notification).await
    }

    async fn notifications_for_recipient(
        &self,
        recipient_id: Uuid,
    ) -> StoreResult<Vec<Notification>> {
        self.inner.notifications_for_recipient(recipient_id).await
    }
}

#[async_trait]
impl<S: ScheduleStore> ScheduleStore for FlakyStore<S> {
    async fn store_schedule(&self, schedule: &ImportSchedule) -> StoreResult<()> {
        self.inner.store_schedule(schedule).await
    }

    async fn due_schedules(&self, now: DateTime<Utc>) -> StoreResult<Vec<ImportSchedule>> {
        self.inner.due_schedules(now).await
    }

    async fn mark_schedule_run(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        self.inner.mark_schedule_run(id, at).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;

    #[tokio::test]
    async fn test_mock_fetcher_counts_calls() {
        let fetcher = MockFetcher::new().with_job(RawJob::new("Dev", "desc"));
        fetcher.fetch(&SearchParams::default()).await.unwrap();
        fetcher.fetch(&SearchParams::default()).await.unwrap();
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_flaky_store_recovers_after_budget() {
        let store = FlakyStore::new(MemoryStore::new(), 2);
        let job = JobRecord::new(JobSource::Api, "e1", "Dev", "desc");

        assert!(store.insert_job(&job).await.is_err());
        assert!(store.insert_job(&job).await.is_err());
        assert_eq!(
            store.insert_job(&job).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(store.insert_attempts(), 3);
    }
}

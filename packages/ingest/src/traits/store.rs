//! Storage traits for jobs, import runs, saved searches, notifications,
//! and schedules.
//!
//! The storage layer is split into focused traits for flexibility:
//! - `JobStore`: deduplicated job records
//! - `RunStore`: import run bookkeeping
//! - `SavedSearchStore`: user filter subscriptions
//! - `NotificationStore`: pipeline-produced notifications
//! - `ScheduleStore`: recurring import configuration
//! - `IngestStore`: composite trait combining all five

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::types::{
    job::{JobRecord, JobSource},
    notification::Notification,
    run::{ImportRun, RunStatus},
    saved_search::{JobFilters, SavedSearch},
    schedule::ImportSchedule,
};

/// Outcome of an insert against the dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was persisted
    Inserted,
    /// A record with the same (source, external_id) already exists
    Duplicate,
}

/// Store for deduplicated job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a record unless its dedup key already exists.
    ///
    /// The existence check and the insert are one logical unit per record:
    /// a unique-constraint violation raised by a concurrent insert must be
    /// reported as `Duplicate` (or `StoreError::Duplicate`), never as a
    /// generic failure.
    async fn insert_job(&self, job: &JobRecord) -> StoreResult<InsertOutcome>;

    /// Look up a record by its dedup key.
    async fn get_job(&self, source: JobSource, external_id: &str) -> StoreResult<Option<JobRecord>>;

    /// Search stored jobs, newest first.
    async fn search_jobs(&self, filters: &JobFilters, limit: usize) -> StoreResult<Vec<JobRecord>>;

    /// Total number of stored jobs.
    async fn count_jobs(&self) -> StoreResult<usize>;
}

/// Store for import run bookkeeping.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Persist a freshly created run (status `Running`).
    async fn create_run(&self, run: &ImportRun) -> StoreResult<()>;

    /// Increment the run's outcome counters.
    async fn record_outcomes(
        &self,
        run_id: Uuid,
        imported: usize,
        skipped: usize,
        failed: usize,
    ) -> StoreResult<()>;

    /// Finalize the run. Called exactly once per run.
    async fn finalize_run(&self, run_id: Uuid, status: RunStatus) -> StoreResult<()>;

    async fn get_run(&self, run_id: Uuid) -> StoreResult<Option<ImportRun>>;
}

/// Store for saved searches.
#[async_trait]
pub trait SavedSearchStore: Send + Sync {
    async fn store_saved_search(&self, search: &SavedSearch) -> StoreResult<()>;

    /// Saved searches subscribed to new-match notifications.
    async fn saved_searches_to_notify(&self) -> StoreResult<Vec<SavedSearch>>;

    async fn saved_searches_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<SavedSearch>>;

    /// Delete a search owned by `owner_id`. Deleting someone else's search
    /// is a no-op.
    async fn delete_saved_search(&self, id: Uuid, owner_id: Uuid) -> StoreResult<()>;
}

/// Store for notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn store_notification(&self, notification: &Notification) -> StoreResult<()>;

    async fn notifications_for_recipient(
        &self,
        recipient_id: Uuid,
    ) -> StoreResult<Vec<Notification>>;
}

/// Store for import schedules.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn store_schedule(&self, schedule: &ImportSchedule) -> StoreResult<()>;

    /// Enabled schedules due to run at `now`, never-run first.
    async fn due_schedules(&self, now: DateTime<Utc>) -> StoreResult<Vec<ImportSchedule>>;

    async fn mark_schedule_run(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;
}

/// Composite store trait for the full pipeline.
pub trait IngestStore:
    JobStore + RunStore + SavedSearchStore + NotificationStore + ScheduleStore
{
}

impl<T> IngestStore for T where
    T: JobStore + RunStore + SavedSearchStore + NotificationStore + ScheduleStore
{
}
